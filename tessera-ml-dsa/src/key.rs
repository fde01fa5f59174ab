//! Parsed ML-DSA public key

use alloc::vec::Vec;

use crate::engine::RingEngine;
use crate::hash::hash_public_key;
use crate::packing::unpack_t1;
use crate::params::{ParameterSet, CRH_BYTES, D, POLY_T1_PACKED_BYTES, SEED_BYTES};
use crate::poly::{Matrix, Ntt, Poly, PolyVec, Standard};
use tessera_core::{Error, Result};

/// A public key `rho || t1`, with everything verification derives from it
/// computed once: tr = H(pk, 64) and NTT(t1 · 2^d).
///
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    params: ParameterSet,
    rho: [u8; SEED_BYTES],
    t1: PolyVec<Standard>,
    t1_scaled_ntt: PolyVec<Ntt>,
    tr: [u8; CRH_BYTES],
    matrix: Option<Matrix>,
}

impl PublicKey {
    /// Parse an encoded public key, using `engine` for the NTT of t1 · 2^d.
    pub fn from_bytes<E: RingEngine>(bytes: &[u8], params: &ParameterSet, engine: &E) -> Result<Self> {
        params.validate()?;
        let expected = params.public_key_bytes();
        if bytes.len() != expected {
            return Err(Error::InvalidKeyLength {
                expected,
                actual: bytes.len(),
            });
        }

        let (rho_bytes, t1_bytes) = bytes.split_at(SEED_BYTES);
        let mut rho = [0u8; SEED_BYTES];
        rho.copy_from_slice(rho_bytes);

        let t1: PolyVec<Standard> = t1_bytes
            .chunks_exact(POLY_T1_PACKED_BYTES)
            .map(unpack_t1)
            .collect::<Result<_>>()?;

        // t1 < 2^10, so t1 · 2^13 <= q - 1 stays canonical.
        let scaled: Vec<Poly<Standard>> = t1
            .iter()
            .map(|p| Poly::from_raw(p.coeffs().map(|c| c << D)))
            .collect();
        let t1_scaled_ntt = engine.forward_ntt_vec(&PolyVec::new(scaled))?;

        Ok(Self {
            params: *params,
            rho,
            t1,
            t1_scaled_ntt,
            tr: hash_public_key(bytes),
            matrix: None,
        })
    }

    /// Attach a precomputed public matrix; the verifier then skips
    /// expansion.
    pub fn with_matrix(mut self, matrix: Matrix) -> Result<Self> {
        matrix.check_shape(self.params.k, self.params.l)?;
        self.matrix = Some(matrix);
        Ok(self)
    }

    /// Parameter set the key was parsed for.
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Public seed.
    pub fn rho(&self) -> &[u8; SEED_BYTES] {
        &self.rho
    }

    /// High bits of t.
    pub fn t1(&self) -> &PolyVec<Standard> {
        &self.t1
    }

    /// tr = H(pk, 64).
    pub fn tr(&self) -> &[u8; CRH_BYTES] {
        &self.tr
    }

    /// Precomputed matrix, if one was attached.
    pub fn matrix(&self) -> Option<&Matrix> {
        self.matrix.as_ref()
    }

    pub(crate) fn t1_scaled_ntt(&self) -> &PolyVec<Ntt> {
        &self.t1_scaled_ntt
    }
}
