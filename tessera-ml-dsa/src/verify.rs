//! ML-DSA signature verification (FIPS 204 Algorithm 3 / 8)
//!
//! Verification runs in two stages. Stage 1 decodes the signature and
//! applies every structural check; stage 2 recomputes the commitment hash
//! through the ring engine and compares it in constant time. A rejected
//! signature is `Ok(false)`; `Err` is reserved for malformed caller input
//! and engine failures.

use alloc::vec::Vec;

use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use crate::decode::{unpack_hint, unpack_response, Hint};
use crate::engine::{RingEngine, SoftwareEngine};
use crate::expand::{MatrixProvider, ShakeExpander};
use crate::hash::{commitment_hash, message_representative};
use crate::key::PublicKey;
use crate::packing::pack_w1;
use crate::params::{ParameterSet, CRH_BYTES};
use crate::poly::{Matrix, PolyVec, Standard};
use crate::rounding::use_hint_poly;
use crate::sample::sample_in_ball;
use tessera_core::{Error, Result, SignatureVerifier, MAX_CONTEXT_LEN};

/// A signature that passed every structural check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSignature<'a> {
    /// Commitment hash cTilde.
    pub c_tilde: &'a [u8],
    /// Response vector z, standard domain, within the norm bound.
    pub z: PolyVec<Standard>,
    /// Hint bits.
    pub hint: Hint,
}

/// ML-DSA verifier bound to one parameter set, one ring engine and one
/// matrix provider.
#[derive(Debug, Clone)]
pub struct Verifier<E = SoftwareEngine, P = ShakeExpander> {
    params: ParameterSet,
    engine: E,
    provider: P,
}

impl Verifier {
    /// Verifier using the in-process engine and SHAKE128 matrix expansion.
    pub fn new(params: ParameterSet) -> Result<Self> {
        Self::with_backends(params, SoftwareEngine, ShakeExpander)
    }
}

impl<E: RingEngine, P: MatrixProvider> Verifier<E, P> {
    /// Verifier with injected backends. Fails if `params` is unsupported.
    pub fn with_backends(params: ParameterSet, engine: E, provider: P) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            engine,
            provider,
        })
    }

    /// The parameter set.
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// The ring engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Parse a public key for this verifier's parameter set.
    pub fn public_key(&self, bytes: &[u8]) -> Result<PublicKey> {
        PublicKey::from_bytes(bytes, &self.params, &self.engine)
    }

    /// Verify `signature` on `message` under `context` (pure ML-DSA).
    ///
    /// The message actually hashed is `0x00 || len(ctx) || ctx || message`.
    pub fn verify(
        &self,
        pk: &PublicKey,
        message: &[u8],
        signature: &[u8],
        context: &[u8],
    ) -> Result<bool> {
        if context.len() > MAX_CONTEXT_LEN {
            return Err(Error::ContextTooLong {
                actual: context.len(),
            });
        }
        let prefix = [0u8, context.len() as u8];
        self.verify_parts(pk, &[&prefix, context, message], signature)
    }

    /// Verify against an already formatted message M' (FIPS 204
    /// ML-DSA.Verify_internal).
    pub fn verify_internal(&self, pk: &PublicKey, formatted: &[u8], signature: &[u8]) -> Result<bool> {
        self.verify_parts(pk, &[formatted], signature)
    }

    fn verify_parts(&self, pk: &PublicKey, formatted: &[&[u8]], signature: &[u8]) -> Result<bool> {
        if pk.params() != &self.params {
            return Err(Error::ParameterMismatch);
        }

        let Some(decoded) = self.decode_and_check(signature)? else {
            return Ok(false);
        };

        let mu = message_representative(pk.tr(), formatted);
        let c_tilde_prime = self.recompute_commitment(pk, &mu, &decoded).map_err(|e| {
            if let Error::Engine(failure) = e {
                warn!(%failure, "verification aborted by ring engine");
            }
            e
        })?;

        let valid = bool::from(decoded.c_tilde.ct_eq(&c_tilde_prime));
        if !valid {
            debug!("commitment hash mismatch");
        }
        Ok(valid)
    }

    /// Stage 1: split the signature and run the structural checks.
    ///
    /// `Ok(None)` means the signature is invalid.
    pub fn decode_and_check<'a>(&self, signature: &'a [u8]) -> Result<Option<DecodedSignature<'a>>> {
        let p = &self.params;
        if signature.len() != p.signature_bytes() {
            debug!(
                len = signature.len(),
                expected = p.signature_bytes(),
                "signature has wrong length"
            );
            return Ok(None);
        }

        let (c_tilde, rest) = signature.split_at(p.c_tilde_bytes);
        let (z_bytes, h_bytes) = rest.split_at(p.z_bytes());

        let Some(hint) = unpack_hint(h_bytes, p.k, p.omega) else {
            return Ok(None);
        };
        if hint.popcount() > p.omega {
            debug!(popcount = hint.popcount(), omega = p.omega, "too many hint bits");
            return Ok(None);
        }

        let Some(z) = unpack_response(z_bytes, p)? else {
            return Ok(None);
        };

        Ok(Some(DecodedSignature { c_tilde, z, hint }))
    }

    /// Stage 2: recompute cTilde' = H(mu || w1Encode(UseHint(h, Az - c·t1·2^d))).
    pub fn recompute_commitment(
        &self,
        pk: &PublicKey,
        mu: &[u8; CRH_BYTES],
        decoded: &DecodedSignature<'_>,
    ) -> Result<Vec<u8>> {
        let p = &self.params;
        let e = &self.engine;

        let c = sample_in_ball(decoded.c_tilde, p.tau);
        let c_hat = e.forward_ntt(&c)?;
        let z_hat = e.forward_ntt_vec(&decoded.z)?;

        let expanded: Matrix;
        let a = match pk.matrix() {
            Some(m) => m,
            None => {
                expanded = self.provider.expand(pk.rho(), p)?;
                expanded.check_shape(p.k, p.l)?;
                &expanded
            }
        };
        let az = e.matrix_vec_mul(a, &z_hat)?;

        let mut w1 = Vec::with_capacity(p.k);
        for (row, (az_row, t1_row)) in az.iter().zip(pk.t1_scaled_ntt().iter()).enumerate() {
            let ct1 = e.pointwise_mul(&c_hat, t1_row)?;
            let diff = e.pointwise_sub(az_row, &ct1)?;
            let w_approx = e.inverse_ntt(&diff)?;
            w1.push(use_hint_poly(&decoded.hint, row, &w_approx, p.gamma2));
        }

        let packed = pack_w1(&w1, p.w1_bits()?);
        Ok(commitment_hash(mu, &packed, p.c_tilde_bytes))
    }
}

impl<E: RingEngine, P: MatrixProvider> SignatureVerifier for Verifier<E, P> {
    type PublicKey = PublicKey;

    fn public_key_size(&self) -> usize {
        self.params.public_key_bytes()
    }

    fn signature_size(&self) -> usize {
        self.params.signature_bytes()
    }

    fn public_key(&self, bytes: &[u8]) -> Result<PublicKey> {
        Verifier::public_key(self, bytes)
    }

    fn verify(&self, pk: &PublicKey, message: &[u8], signature: &[u8], context: &[u8]) -> Result<bool> {
        Verifier::verify(self, pk, message, signature, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accelerator::{decode_request, encode_response, AcceleratorEngine, RingOp, Transport};
    use crate::params::{ALL, ML_DSA_44, ML_DSA_65, ML_DSA_87};
    use crate::poly::{Ntt, Poly};
    use crate::testing::{KeyPair, FIXED_RND};
    use alloc::vec;
    use tessera_core::EngineFailure;

    fn fixture(params: ParameterSet, seed: u8) -> (Verifier, KeyPair, Vec<u8>) {
        let verifier = Verifier::new(params).unwrap();
        let kp = KeyPair::generate(&params, &[seed; 32]);
        let sig = kp.sign(b"attack at dawn", b"tessera", &FIXED_RND);
        (verifier, kp, sig)
    }

    #[test]
    fn test_valid_signatures_all_sets() {
        for (i, params) in ALL.into_iter().enumerate() {
            let (verifier, kp, sig) = fixture(params, i as u8);
            assert_eq!(sig.len(), params.signature_bytes());
            let pk = verifier.public_key(&kp.public_key).unwrap();
            assert!(verifier.verify(&pk, b"attack at dawn", &sig, b"tessera").unwrap(), "{params}");
        }
    }

    #[test]
    fn test_wrong_message_or_context() {
        let (verifier, kp, sig) = fixture(ML_DSA_44, 1);
        let pk = verifier.public_key(&kp.public_key).unwrap();
        assert!(!verifier.verify(&pk, b"attack at dusk", &sig, b"tessera").unwrap());
        assert!(!verifier.verify(&pk, b"attack at dawn", &sig, b"").unwrap());
        assert!(!verifier.verify(&pk, b"attack at dawn", &sig, b"tesserA").unwrap());
    }

    #[test]
    fn test_c_tilde_bit_flips() {
        let (verifier, kp, sig) = fixture(ML_DSA_44, 2);
        let pk = verifier.public_key(&kp.public_key).unwrap();
        for bit in 0..ML_DSA_44.c_tilde_bytes * 8 {
            let mut bad = sig.clone();
            bad[bit / 8] ^= 1 << (bit % 8);
            assert!(
                !verifier.verify(&pk, b"attack at dawn", &bad, b"tessera").unwrap(),
                "flipping bit {bit} was accepted"
            );
        }
    }

    #[test]
    fn test_context_length_limit() {
        let (verifier, kp, sig) = fixture(ML_DSA_65, 3);
        let pk = verifier.public_key(&kp.public_key).unwrap();

        let ctx = vec![0xAB; 256];
        assert_eq!(
            verifier.verify(&pk, b"attack at dawn", &sig, &ctx),
            Err(Error::ContextTooLong { actual: 256 })
        );

        // 255 bytes is allowed and round-trips through the signer.
        let ctx = vec![0xAB; 255];
        let sig = kp.sign(b"m", &ctx, &FIXED_RND);
        assert!(verifier.verify(&pk, b"m", &sig, &ctx).unwrap());
    }

    #[test]
    fn test_verify_internal_matches_formatted_message() {
        let (verifier, kp, sig) = fixture(ML_DSA_87, 4);
        let pk = verifier.public_key(&kp.public_key).unwrap();

        let mut formatted = vec![0u8, 7];
        formatted.extend_from_slice(b"tessera");
        formatted.extend_from_slice(b"attack at dawn");
        assert!(verifier.verify_internal(&pk, &formatted, &sig).unwrap());
        assert!(!verifier.verify_internal(&pk, b"attack at dawn", &sig).unwrap());
    }

    #[test]
    fn test_wrong_length_signature_is_invalid() {
        let (verifier, kp, sig) = fixture(ML_DSA_44, 5);
        let pk = verifier.public_key(&kp.public_key).unwrap();
        assert!(!verifier.verify(&pk, b"attack at dawn", &sig[..sig.len() - 1], b"tessera").unwrap());
        assert!(!verifier.verify(&pk, b"attack at dawn", &[], b"tessera").unwrap());
    }

    #[test]
    fn test_corrupted_hint_is_invalid() {
        let (verifier, kp, sig) = fixture(ML_DSA_44, 6);
        let pk = verifier.public_key(&kp.public_key).unwrap();

        let h_start = ML_DSA_44.c_tilde_bytes + ML_DSA_44.z_bytes();
        let mut bad = sig.clone();
        // Last row boundary past omega.
        bad[h_start + ML_DSA_44.omega + ML_DSA_44.k - 1] = (ML_DSA_44.omega + 1) as u8;
        assert_eq!(verifier.decode_and_check(&bad).unwrap(), None);
        assert!(!verifier.verify(&pk, b"attack at dawn", &bad, b"tessera").unwrap());
    }

    #[test]
    fn test_out_of_bound_response_is_invalid() {
        let (verifier, _, sig) = fixture(ML_DSA_44, 7);
        let mut bad = sig.clone();
        // Zero the first packed coefficient: it decodes to z = gamma1.
        let start = ML_DSA_44.c_tilde_bytes;
        bad[start] = 0;
        bad[start + 1] = 0;
        bad[start + 2] &= 0xFC;
        assert_eq!(verifier.decode_and_check(&bad).unwrap(), None);
        assert!(verifier.decode_and_check(&sig).unwrap().is_some());
    }

    #[test]
    fn test_public_key_errors() {
        let verifier = Verifier::new(ML_DSA_65).unwrap();
        assert_eq!(
            verifier.public_key(&[0u8; 10]),
            Err(Error::InvalidKeyLength {
                expected: 1952,
                actual: 10
            })
        );

        let (v44, kp, sig) = fixture(ML_DSA_44, 8);
        let pk44 = v44.public_key(&kp.public_key).unwrap();
        assert_eq!(
            verifier.verify(&pk44, b"attack at dawn", &sig, b"tessera"),
            Err(Error::ParameterMismatch)
        );
    }

    #[test]
    fn test_unsupported_parameters_rejected_at_construction() {
        let bad = ParameterSet {
            gamma1: 1 << 18,
            ..ML_DSA_65
        };
        assert!(matches!(
            Verifier::new(bad),
            Err(Error::UnsupportedGamma1 { gamma1: 262_144 })
        ));
    }

    #[test]
    fn test_precomputed_matrix() {
        let (verifier, kp, sig) = fixture(ML_DSA_65, 9);
        let pk = verifier.public_key(&kp.public_key).unwrap();
        let a = ShakeExpander.expand(pk.rho(), &ML_DSA_65).unwrap();
        let compact = a.to_compact_bytes();
        let a = Matrix::from_compact_bytes(&compact, 6, 5).unwrap();

        let pk = pk.with_matrix(a).unwrap();
        assert!(verifier.verify(&pk, b"attack at dawn", &sig, b"tessera").unwrap());
    }

    struct NoMatrix;

    impl MatrixProvider for NoMatrix {
        fn expand(&self, _rho: &[u8; 32], _params: &ParameterSet) -> Result<Matrix> {
            Matrix::new(1, 1, vec![Poly::<Ntt>::zero()])
        }
    }

    #[test]
    fn test_provider_shape_checked() {
        let (_, kp, sig) = fixture(ML_DSA_44, 10);
        let verifier = Verifier::with_backends(ML_DSA_44, SoftwareEngine, NoMatrix).unwrap();
        let pk = verifier.public_key(&kp.public_key).unwrap();
        assert!(matches!(
            verifier.verify(&pk, b"attack at dawn", &sig, b"tessera"),
            Err(Error::MatrixShape { .. })
        ));
    }

    /// Loopback accelerator that can be told to corrupt the response to one
    /// operation.
    struct Flaky {
        corrupt: Option<RingOp>,
    }

    impl Transport for Flaky {
        type Error = Error;

        fn call(&self, op: RingOp, request: &[u8]) -> Result<Vec<u8>> {
            if self.corrupt == Some(op) {
                return Ok(vec![0u8; 1000]);
            }
            let ops = decode_request(op, request)?;
            let e = SoftwareEngine;
            let plain = |i: usize| Poly::<Standard>::from_coeffs(ops[i]);
            let ntt = |i: usize| Poly::<Ntt>::from_coeffs(ops[i]);
            let out = match op {
                RingOp::ForwardNtt => e.forward_ntt(&plain(0))?.into_coeffs(),
                RingOp::InverseNtt => e.inverse_ntt(&ntt(0))?.into_coeffs(),
                RingOp::PointwiseMul => e.pointwise_mul(&ntt(0), &ntt(1))?.into_coeffs(),
                RingOp::PointwiseAdd => e.pointwise_add(&ntt(0), &ntt(1))?.into_coeffs(),
                RingOp::PointwiseSub => e.pointwise_sub(&ntt(0), &ntt(1))?.into_coeffs(),
            };
            Ok(encode_response(&out))
        }
    }

    #[test]
    fn test_accelerator_backend_verifies() {
        let (_, kp, sig) = fixture(ML_DSA_44, 11);
        let engine = AcceleratorEngine::new(Flaky { corrupt: None });
        let verifier = Verifier::with_backends(ML_DSA_44, engine, ShakeExpander).unwrap();
        let pk = verifier.public_key(&kp.public_key).unwrap();
        assert!(verifier.verify(&pk, b"attack at dawn", &sig, b"tessera").unwrap());
    }

    #[test]
    fn test_engine_failure_is_not_invalid() {
        let (_, kp, sig) = fixture(ML_DSA_44, 12);
        let pk = Verifier::new(ML_DSA_44).unwrap().public_key(&kp.public_key).unwrap();

        for op in [RingOp::ForwardNtt, RingOp::InverseNtt, RingOp::PointwiseMul, RingOp::PointwiseSub] {
            let engine = AcceleratorEngine::new(Flaky { corrupt: Some(op) });
            let verifier = Verifier::with_backends(ML_DSA_44, engine, ShakeExpander).unwrap();
            assert_eq!(
                verifier.verify(&pk, b"attack at dawn", &sig, b"tessera"),
                Err(Error::Engine(EngineFailure::ResponseLength {
                    expected: 1024,
                    actual: 1000
                })),
                "{op:?}"
            );
        }

        // A structurally invalid signature never reaches the engine.
        let engine = AcceleratorEngine::new(Flaky { corrupt: Some(RingOp::ForwardNtt) });
        let verifier = Verifier::with_backends(ML_DSA_44, engine, ShakeExpander).unwrap();
        assert_eq!(verifier.verify(&pk, b"attack at dawn", &sig[1..], b"tessera"), Ok(false));
    }

    #[test]
    fn test_signature_verifier_trait() {
        fn check<V: SignatureVerifier>(v: &V, pk: &[u8], sig: &[u8]) -> Result<bool> {
            let pk = v.public_key(pk)?;
            v.verify(&pk, b"attack at dawn", sig, b"tessera")
        }

        let (verifier, kp, sig) = fixture(ML_DSA_44, 13);
        assert_eq!(verifier.public_key_size(), 1312);
        assert_eq!(verifier.signature_size(), 2420);
        assert_eq!(check(&verifier, &kp.public_key, &sig), Ok(true));
    }
}
