//! Decompose and UseHint
//!
//! The verifier only needs these two; the signer-side rounding helpers live
//! with the test signer.

use crate::decode::Hint;
use crate::poly::{Poly, Standard};
use crate::reduce::Q;

/// Decompose: split r into (r1, r0) with r = r1 * alpha + r0 (mod q),
/// alpha = 2 * gamma2, r0 in (-alpha/2, alpha/2].
///
/// Input: r in [0, q-1], gamma2 one of (q-1)/88 or (q-1)/32.
///
/// Division by alpha is a multiply-shift:
/// - gamma2 = (q-1)/32: alpha = 523776 = 128 * 4092, m = 16. 1025 / 2^22
///   approximates 1 / 4092 and the result is taken mod 16.
/// - gamma2 = (q-1)/88: alpha = 190464 = 128 * 1488, m = 44. 11275 / 2^24
///   approximates 1 / 1488 and r1 = 44 wraps to 0.
///
/// At the wraparound r - r1 * alpha exceeds (q-1)/2 and subtracting q
/// yields r0 = r - q, i.e. the r+ - r0 = q - 1 special case.
#[inline]
pub fn decompose(r: i32, gamma2: i32) -> (i32, i32) {
    let alpha = 2 * gamma2;

    let mut r1 = (r + 127) >> 7;
    if gamma2 == (Q - 1) / 32 {
        r1 = (r1 * 1025 + (1 << 21)) >> 22;
        r1 &= 15;
    } else {
        r1 = (r1 * 11275 + (1 << 23)) >> 24;
        r1 ^= ((43 - r1) >> 31) & r1;
    }

    let mut r0 = r - r1 * alpha;
    r0 -= (((Q - 1) / 2 - r0) >> 31) & Q;

    (r1, r0)
}

/// UseHint: recover HighBits(r + z) from r and the hint bit.
///
/// A set hint moves r1 one step toward the side r0 lies on, modulo
/// m = (q-1) / alpha, so r1 = m - 1 steps to 0 and r1 = 0 steps to m - 1.
#[inline]
pub fn use_hint(hint: bool, r: i32, gamma2: i32) -> i32 {
    let (r1, r0) = decompose(r, gamma2);
    if !hint {
        return r1;
    }

    let m = (Q - 1) / (2 * gamma2);
    if r0 > 0 {
        if r1 == m - 1 {
            0
        } else {
            r1 + 1
        }
    } else if r1 == 0 {
        m - 1
    } else {
        r1 - 1
    }
}

/// Apply row `row` of `hint` to every coefficient of `w`.
pub fn use_hint_poly(hint: &Hint, row: usize, w: &Poly<Standard>, gamma2: i32) -> Poly<Standard> {
    let c = w.coeffs();
    // High bits lie in [0, m) with m <= 44.
    Poly::from_raw(core::array::from_fn(|i| {
        use_hint(hint.get(row, i), c[i], gamma2)
    }))
}
