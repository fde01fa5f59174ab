//! Reference ML-DSA key generation and signing (FIPS 204 Algorithms 6
//! and 7), used only to produce signatures for the verifier's tests.
//!
//! All arithmetic goes through [`SoftwareEngine`] on canonical
//! polynomials. Nothing here is constant time.

use alloc::vec::Vec;

use crate::decode::{response_from_altered, Hint};
use crate::engine::{RingEngine, SoftwareEngine};
use crate::expand::{MatrixProvider, ShakeExpander};
use crate::hash::{commitment_hash, h, hash_public_key, message_representative, Shake256Xof};
use crate::packing::{pack_response, pack_t1, pack_w1, BitReader};
use crate::params::{ParameterSet, CRH_BYTES, D, SEED_BYTES};
use crate::poly::{Matrix, Ntt, Poly, PolyVec, Standard, N};
use crate::rounding::decompose;
use crate::sample::sample_in_ball;

/// Deterministic signing randomness.
pub(crate) const FIXED_RND: [u8; 32] = [0u8; 32];

/// Power2Round: r = r1 * 2^d + r0 with r0 in (-2^(d-1), 2^(d-1)].
pub(crate) fn power2round(r: i32) -> (i32, i32) {
    let r1 = (r + (1 << (D - 1)) - 1) >> D;
    (r1, r - (r1 << D))
}

/// RejBoundedPoly: coefficients in [-eta, eta] from SHAKE256(seed || nonce).
pub(crate) fn sample_eta(seed: &[u8; CRH_BYTES], nonce: u16, eta: usize) -> Poly<Standard> {
    let mut xof = Shake256Xof::new(&[seed, &nonce.to_le_bytes()]);
    let mut coeffs = [0i32; N];
    let mut ctr = 0;

    let from_half_byte = |b: i32| match eta {
        2 if b < 15 => Some(2 - b % 5),
        4 if b < 9 => Some(4 - b),
        _ => None,
    };

    while ctr < N {
        let byte = xof.next_byte();
        for half in [i32::from(byte & 0x0F), i32::from(byte >> 4)] {
            if ctr < N {
                if let Some(c) = from_half_byte(half) {
                    coeffs[ctr] = c;
                    ctr += 1;
                }
            }
        }
    }

    Poly::from_coeffs(coeffs)
}

/// ExpandMask for one polynomial: coefficients in (-gamma1, gamma1].
pub(crate) fn expand_mask(seed: &[u8; CRH_BYTES], nonce: u16, params: &ParameterSet) -> Poly<Standard> {
    let bits = params.z_bits().unwrap();
    let mut buf = alloc::vec![0u8; N * bits as usize / 8];
    Shake256Xof::new(&[seed, &nonce.to_le_bytes()]).squeeze(&mut buf);

    let mut reader = BitReader::new(&buf);
    let coeffs = core::array::from_fn(|_| {
        let altered = reader.read(bits).unwrap() as i32;
        response_from_altered(altered, params.gamma1)
    });
    Poly::from_canonical(coeffs).unwrap()
}

/// An ML-DSA key pair held in expanded form.
pub(crate) struct KeyPair {
    pub public_key: Vec<u8>,
    params: ParameterSet,
    key: [u8; 32],
    tr: [u8; CRH_BYTES],
    a: Matrix,
    s1_hat: PolyVec<Ntt>,
    s2_hat: PolyVec<Ntt>,
    t0_hat: PolyVec<Ntt>,
}

impl KeyPair {
    /// ML-DSA.KeyGen_internal(xi).
    pub(crate) fn generate(params: &ParameterSet, xi: &[u8; 32]) -> Self {
        let e = SoftwareEngine;
        let (k, l) = (params.k, params.l);

        let mut seeds = [0u8; 128];
        h(&[xi, &[k as u8, l as u8]], &mut seeds);
        let mut rho = [0u8; SEED_BYTES];
        let mut rho_prime = [0u8; CRH_BYTES];
        let mut key = [0u8; 32];
        rho.copy_from_slice(&seeds[..32]);
        rho_prime.copy_from_slice(&seeds[32..96]);
        key.copy_from_slice(&seeds[96..]);

        let a = ShakeExpander.expand(&rho, params).unwrap();
        let s1: PolyVec<Standard> = (0..l)
            .map(|r| sample_eta(&rho_prime, r as u16, params.eta))
            .collect();
        let s2: PolyVec<Standard> = (0..k)
            .map(|r| sample_eta(&rho_prime, (l + r) as u16, params.eta))
            .collect();

        let s1_hat = e.forward_ntt_vec(&s1).unwrap();
        let as1 = e.inverse_ntt_vec(&e.matrix_vec_mul(&a, &s1_hat).unwrap()).unwrap();

        let mut public_key = rho.to_vec();
        let mut t0 = Vec::with_capacity(k);
        for (as1_row, s2_row) in as1.iter().zip(s2.iter()) {
            let t = e.pointwise_add(as1_row, s2_row).unwrap();
            let split = t.coeffs().map(power2round);
            let t1 = Poly::<Standard>::from_coeffs(split.map(|(hi, _)| hi));
            public_key.extend_from_slice(&pack_t1(&t1));
            t0.push(Poly::<Standard>::from_coeffs(split.map(|(_, lo)| lo)));
        }

        Self {
            tr: hash_public_key(&public_key),
            public_key,
            params: *params,
            key,
            a,
            s1_hat,
            s2_hat: e.forward_ntt_vec(&s2).unwrap(),
            t0_hat: e.forward_ntt_vec(&PolyVec::new(t0)).unwrap(),
        }
    }

    /// ML-DSA.Sign with a context string.
    pub(crate) fn sign(&self, message: &[u8], context: &[u8], rnd: &[u8; 32]) -> Vec<u8> {
        let mut formatted = alloc::vec![0u8, context.len() as u8];
        formatted.extend_from_slice(context);
        formatted.extend_from_slice(message);
        self.sign_internal(&formatted, rnd)
    }

    fn mul_each(&self, c_hat: &Poly<Ntt>, v: &PolyVec<Ntt>) -> PolyVec<Standard> {
        let e = SoftwareEngine;
        v.iter()
            .map(|p| e.inverse_ntt(&e.pointwise_mul(c_hat, p).unwrap()).unwrap())
            .collect()
    }

    /// ML-DSA.Sign_internal(sk, M', rnd).
    pub(crate) fn sign_internal(&self, formatted: &[u8], rnd: &[u8; 32]) -> Vec<u8> {
        let e = SoftwareEngine;
        let p = &self.params;
        let g2 = p.gamma2;

        let mu = message_representative(&self.tr, &[formatted]);
        let mut rho2 = [0u8; CRH_BYTES];
        h(&[&self.key, rnd, &mu], &mut rho2);

        let mut kappa = 0u16;
        loop {
            let y: PolyVec<Standard> = (0..p.l)
                .map(|r| expand_mask(&rho2, kappa + r as u16, p))
                .collect();
            kappa += p.l as u16;

            let y_hat = e.forward_ntt_vec(&y).unwrap();
            let w = e.inverse_ntt_vec(&e.matrix_vec_mul(&self.a, &y_hat).unwrap()).unwrap();
            let w1: Vec<Poly<Standard>> = w
                .iter()
                .map(|poly| Poly::from_coeffs(poly.coeffs().map(|c| decompose(c, g2).0)))
                .collect();

            let c_tilde = commitment_hash(&mu, &pack_w1(&w1, p.w1_bits().unwrap()), p.c_tilde_bytes);
            let c_hat = e.forward_ntt(&sample_in_ball(&c_tilde, p.tau)).unwrap();

            let cs1 = self.mul_each(&c_hat, &self.s1_hat);
            let z: PolyVec<Standard> = y
                .iter()
                .zip(cs1.iter())
                .map(|(a, b)| e.pointwise_add(a, b).unwrap())
                .collect();
            if z.norm_inf() >= p.gamma1 - p.beta {
                continue;
            }

            let cs2 = self.mul_each(&c_hat, &self.s2_hat);
            let w_cs2: PolyVec<Standard> = w
                .iter()
                .zip(cs2.iter())
                .map(|(a, b)| e.pointwise_sub(a, b).unwrap())
                .collect();
            let r0_max = w_cs2
                .iter()
                .flat_map(|poly| poly.coeffs().iter())
                .map(|&c| decompose(c, g2).1.abs())
                .max()
                .unwrap_or(0);
            if r0_max >= g2 - p.beta {
                continue;
            }

            let ct0 = self.mul_each(&c_hat, &self.t0_hat);
            if ct0.norm_inf() >= g2 {
                continue;
            }

            let mut hint = Hint::empty(p.k);
            for (row, (r, ct)) in w_cs2.iter().zip(ct0.iter()).enumerate() {
                let shifted = e.pointwise_add(r, ct).unwrap();
                for i in 0..N {
                    if decompose(shifted[i], g2).0 != decompose(r[i], g2).0 {
                        hint.set(row, i);
                    }
                }
            }
            let Some(hint_bytes) = hint.to_bytes(p.omega) else {
                continue;
            };

            let mut sig = c_tilde;
            sig.extend_from_slice(&pack_response(&z, p.gamma1, p.z_bits().unwrap()));
            sig.extend_from_slice(&hint_bytes);
            return sig;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ML_DSA_44, ML_DSA_65};
    use crate::reduce::Q;

    #[test]
    fn test_power2round() {
        let bound = 1 << (D - 1);
        for r in [0, 1, 4096, 4097, 8191, 8192, Q / 2, Q - 1] {
            let (r1, r0) = power2round(r);
            assert_eq!(r1 * (1 << D) + r0, r, "r={r}");
            assert!(r0 > -bound && r0 <= bound, "r0={r0} for r={r}");
            assert!((0..1024).contains(&r1));
        }
    }

    #[test]
    fn test_sample_eta_range() {
        for eta in [2, 4] {
            let p = sample_eta(&[1u8; 64], 3, eta);
            assert!(p.norm_inf() <= eta as i32);
        }
    }

    #[test]
    fn test_expand_mask_range() {
        for params in [ML_DSA_44, ML_DSA_65] {
            let y = expand_mask(&[2u8; 64], 0, &params);
            assert!(y.norm_inf() <= params.gamma1);
        }
    }

    #[test]
    fn test_keygen_deterministic() {
        let a = KeyPair::generate(&ML_DSA_44, &[7u8; 32]);
        let b = KeyPair::generate(&ML_DSA_44, &[7u8; 32]);
        assert_eq!(a.public_key, b.public_key);
        assert_eq!(a.public_key.len(), ML_DSA_44.public_key_bytes());
        assert_eq!(a.sign(b"m", b"", &FIXED_RND), b.sign(b"m", b"", &FIXED_RND));
    }
}
