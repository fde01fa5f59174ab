//! Modular arithmetic for the ML-DSA ring
//!
//! All operations are performed modulo q = 8380417 = 2^23 - 2^13 + 1.

/// The prime modulus q = 8380417
pub const Q: i32 = 8_380_417;

/// q^(-1) mod 2^32 for Montgomery reduction
pub const QINV: i32 = 58_728_449;

/// (2^32)^2 mod q, multiplying by this in Montgomery form lifts a value by R
pub const MONT_R2: i32 = 2_365_951;

/// Montgomery reduction: compute a * R^(-1) mod q where R = 2^32.
///
/// Input: |a| < q * 2^31
/// Output: r ≡ a * R^(-1) (mod q) with |r| < q
#[inline]
pub const fn montgomery_reduce(a: i64) -> i32 {
    let t = (a as i32).wrapping_mul(QINV);
    ((a - (t as i64) * (Q as i64)) >> 32) as i32
}

/// Montgomery multiplication: compute a * b * R^(-1) mod q.
#[inline]
pub const fn montgomery_mul(a: i32, b: i32) -> i32 {
    montgomery_reduce((a as i64) * (b as i64))
}

/// Plain modular product a * b mod q, result in (-q, q).
///
/// Two Montgomery steps: the first leaves a*b*R^(-1), the second multiplies
/// by R^2 and drops one more R^(-1).
#[inline]
pub const fn mul_mod(a: i32, b: i32) -> i32 {
    montgomery_mul(montgomery_mul(a, b), MONT_R2)
}

/// Reduce a to a representative in [-6283008, 6283008].
///
/// Input: a <= 2^31 - 2^22 - 1
#[inline]
pub const fn reduce32(a: i32) -> i32 {
    let t = (a + (1 << 22)) >> 23;
    a - t * Q
}

/// Conditionally add q so that a value in (-q, q) lands in [0, q).
#[inline]
pub const fn caddq(a: i32) -> i32 {
    a + (Q & (a >> 31))
}

/// Freeze: reduce to canonical [0, q-1] range.
#[inline]
pub const fn freeze(a: i32) -> i32 {
    caddq(reduce32(a))
}

/// Map a signed value with |a| < q to its canonical residue by adding q at
/// most once. Returns `None` when a single correction cannot suffice.
#[inline]
pub const fn canonicalize(a: i32) -> Option<i32> {
    if a <= -Q || a >= Q {
        None
    } else {
        Some(caddq(a))
    }
}

/// Centered magnitude of a canonical residue: min(a, q - a).
#[inline]
pub const fn centered_abs(a: i32) -> i32 {
    if a > (Q - 1) / 2 {
        Q - a
    } else {
        a
    }
}
