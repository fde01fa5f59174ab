//! Shared fixtures for the Tessera benchmarks.
//!
//! [`Loopback`] stands in for an accelerator by serving wire-format
//! requests with the software engine, so the accelerator path can be timed
//! without hardware. [`Fixture`] builds a public key and a structurally
//! valid signature from a seeded RNG.

use rand::rngs::StdRng;
use rand::Rng;
use tessera_ml_dsa::accelerator::{decode_request, encode_response};
use tessera_ml_dsa::packing::pack_response;
use tessera_ml_dsa::reduce::Q;
use tessera_ml_dsa::{
    Domain, Error, Hint, Ntt, ParameterSet, Poly, PolyVec, Result, RingEngine, RingOp, SoftwareEngine, Standard,
    Transport,
};

/// A canonical polynomial with uniformly random coefficients.
pub fn random_poly<D: Domain>(rng: &mut StdRng) -> Poly<D> {
    Poly::from_coeffs(core::array::from_fn(|_| rng.random_range(0..Q)))
}

/// Serves requests with the software engine, as a device would.
#[derive(Debug, Clone, Copy, Default)]
pub struct Loopback;

impl Transport for Loopback {
    type Error = Error;

    fn call(&self, op: RingOp, request: &[u8]) -> Result<Vec<u8>> {
        let e = SoftwareEngine;
        let x = decode_request(op, request)?;
        let out = match op {
            RingOp::ForwardNtt => e.forward_ntt(&Poly::<Standard>::from_coeffs(x[0]))?.into_coeffs(),
            RingOp::InverseNtt => e.inverse_ntt(&Poly::<Ntt>::from_coeffs(x[0]))?.into_coeffs(),
            RingOp::PointwiseMul => e
                .pointwise_mul(&Poly::<Ntt>::from_coeffs(x[0]), &Poly::from_coeffs(x[1]))?
                .into_coeffs(),
            RingOp::PointwiseAdd => e
                .pointwise_add(&Poly::<Ntt>::from_coeffs(x[0]), &Poly::from_coeffs(x[1]))?
                .into_coeffs(),
            RingOp::PointwiseSub => e
                .pointwise_sub(&Poly::<Ntt>::from_coeffs(x[0]), &Poly::from_coeffs(x[1]))?
                .into_coeffs(),
        };
        Ok(encode_response(&out))
    }
}

/// A random public key and a signature that passes every structural check.
///
/// The signature has a small response, an empty hint and a random
/// commitment hash, so verification runs both stages and rejects only at
/// the final comparison.
pub struct Fixture {
    /// Encoded public key.
    pub public_key: Vec<u8>,
    /// Encoded signature.
    pub signature: Vec<u8>,
}

impl Fixture {
    /// Build a fixture for `params`.
    pub fn new(params: &ParameterSet, rng: &mut StdRng) -> Result<Self> {
        let mut public_key = vec![0u8; params.public_key_bytes()];
        rng.fill(&mut public_key[..]);

        let small = params.beta;
        let z: PolyVec<Standard> = (0..params.l)
            .map(|_| Poly::from_coeffs(core::array::from_fn(|_| rng.random_range(-small..=small))))
            .collect();

        let mut signature = vec![0u8; params.c_tilde_bytes];
        rng.fill(&mut signature[..]);
        signature.extend(pack_response(&z, params.gamma1, params.z_bits()?));
        signature.extend(
            Hint::empty(params.k)
                .to_bytes(params.omega)
                .ok_or(Error::EncodingError)?,
        );

        Ok(Self {
            public_key,
            signature,
        })
    }
}
