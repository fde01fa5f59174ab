//! Sampling functions for ML-DSA
//!
//! SampleInBall for the challenge and the uniform rejection sampler behind
//! ExpandA. Secret and mask sampling belong to signing and are not here.

use crate::hash::{Shake128Xof, Shake256Xof};
use crate::params::MAX_TAU;
use crate::poly::{Ntt, Poly, Standard, N};
use crate::reduce::Q;

/// Sample a uniform polynomial in the NTT domain from SHAKE128.
///
/// Three bytes per candidate, top bit cleared, accepted if below q.
pub fn sample_uniform(xof: &mut Shake128Xof) -> Poly<Ntt> {
    let mut coeffs = [0i32; N];
    let mut buf = [0u8; 168]; // one SHAKE128 block
    let mut ctr = 0;

    while ctr < N {
        xof.squeeze(&mut buf);
        for chunk in buf.chunks_exact(3) {
            let t = i32::from(chunk[0])
                | (i32::from(chunk[1]) << 8)
                | (i32::from(chunk[2] & 0x7F) << 16);
            if t < Q {
                coeffs[ctr] = t;
                ctr += 1;
                if ctr == N {
                    break;
                }
            }
        }
    }

    Poly::from_raw(coeffs)
}

/// SampleInBall: challenge polynomial with exactly `tau` coefficients in
/// {1, q-1} and the rest zero, derived from the commitment hash.
///
/// The first 8 bytes of the stream are sign bits, consumed LSB first; each
/// position j <= i is then drawn by byte rejection. Only 64 sign bits
/// exist, so `tau` is capped at [`MAX_TAU`].
pub fn sample_in_ball(seed: &[u8], tau: usize) -> Poly<Standard> {
    let tau = tau.min(MAX_TAU);
    let mut coeffs = [0i32; N];
    let mut xof = Shake256Xof::new(&[seed]);

    let mut signs = [0u8; 8];
    xof.squeeze(&mut signs);
    let mut sign_bits = u64::from_le_bytes(signs);

    for i in (N - tau)..N {
        let j = loop {
            let j = usize::from(xof.next_byte());
            if j <= i {
                break j;
            }
        };
        coeffs[i] = coeffs[j];
        coeffs[j] = if sign_bits & 1 == 1 { Q - 1 } else { 1 };
        sign_bits >>= 1;
    }

    Poly::from_raw(coeffs)
}
