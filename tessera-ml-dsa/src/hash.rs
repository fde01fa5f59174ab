//! Hash functions for ML-DSA
//!
//! Uses SHAKE128 and SHAKE256 from FIPS 202.

use alloc::vec::Vec;

use crate::params::CRH_BYTES;
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake128, Shake256,
};

/// SHAKE256 stream: absorb once, squeeze on demand.
pub struct Shake256Xof {
    reader: sha3::Shake256Reader,
}

impl Shake256Xof {
    /// Absorb the concatenation of `parts`.
    pub fn new(parts: &[&[u8]]) -> Self {
        let mut hasher = Shake256::default();
        for part in parts {
            hasher.update(part);
        }
        Self {
            reader: hasher.finalize_xof(),
        }
    }

    /// Squeeze bytes from the XOF.
    pub fn squeeze(&mut self, out: &mut [u8]) {
        self.reader.read(out);
    }

    /// Squeeze a single byte.
    pub fn next_byte(&mut self) -> u8 {
        let mut b = [0u8; 1];
        self.reader.read(&mut b);
        b[0]
    }
}

/// SHAKE128 stream for matrix expansion.
pub struct Shake128Xof {
    reader: sha3::Shake128Reader,
}

impl Shake128Xof {
    /// Create SHAKE128 from rho and matrix position (row i, column j).
    pub fn new(rho: &[u8; 32], i: u8, j: u8) -> Self {
        let mut hasher = Shake128::default();
        hasher.update(rho);
        hasher.update(&[j, i]); // column first per FIPS 204
        Self {
            reader: hasher.finalize_xof(),
        }
    }

    /// Squeeze bytes from the XOF.
    pub fn squeeze(&mut self, out: &mut [u8]) {
        self.reader.read(out);
    }
}

/// H: SHAKE256 over the concatenation of `parts`, filling `out`.
pub fn h(parts: &[&[u8]], out: &mut [u8]) {
    Shake256Xof::new(parts).squeeze(out);
}

/// tr = H(pk, 64).
pub fn hash_public_key(pk: &[u8]) -> [u8; CRH_BYTES] {
    let mut tr = [0u8; CRH_BYTES];
    h(&[pk], &mut tr);
    tr
}

/// mu = H(tr || M', 64) where M' is the already formatted message.
pub fn message_representative(tr: &[u8; CRH_BYTES], formatted: &[&[u8]]) -> [u8; CRH_BYTES] {
    let mut hasher = Shake256::default();
    hasher.update(tr);
    for part in formatted {
        hasher.update(part);
    }
    let mut mu = [0u8; CRH_BYTES];
    hasher.finalize_xof().read(&mut mu);
    mu
}

/// Commitment hash cTilde = H(mu || w1Encode(w1), len).
pub fn commitment_hash(mu: &[u8; CRH_BYTES], w1_packed: &[u8], len: usize) -> Vec<u8> {
    let mut out = alloc::vec![0u8; len];
    h(&[mu, w1_packed], &mut out);
    out
}
