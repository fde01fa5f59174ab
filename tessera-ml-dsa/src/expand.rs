//! Public matrix expansion
//!
//! The verifier consumes the matrix through [`MatrixProvider`]. Hosts that
//! cache or precompute matrices plug in their own provider;
//! [`ShakeExpander`] is ExpandA from FIPS 204.

use alloc::vec::Vec;

use crate::hash::Shake128Xof;
use crate::params::{ParameterSet, SEED_BYTES};
use crate::poly::Matrix;
use crate::sample::sample_uniform;
use tessera_core::{Error, Result};

/// Source of the k×l public matrix for a public seed.
pub trait MatrixProvider {
    /// Produce A for `rho` under `params`. The result must be k×l.
    fn expand(&self, rho: &[u8; SEED_BYTES], params: &ParameterSet) -> Result<Matrix>;
}

impl<P: MatrixProvider + ?Sized> MatrixProvider for &P {
    fn expand(&self, rho: &[u8; SEED_BYTES], params: &ParameterSet) -> Result<Matrix> {
        (**self).expand(rho, params)
    }
}

/// ExpandA: A[i][j] = RejNTTPoly(SHAKE128(rho || j || i)).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShakeExpander;

impl MatrixProvider for ShakeExpander {
    fn expand(&self, rho: &[u8; SEED_BYTES], params: &ParameterSet) -> Result<Matrix> {
        let (k, l) = (params.k, params.l);
        if k > usize::from(u8::MAX) || l > usize::from(u8::MAX) {
            return Err(Error::UnsupportedParameterSet);
        }

        let mut entries = Vec::with_capacity(k * l);
        for i in 0..k {
            for j in 0..l {
                let mut xof = Shake128Xof::new(rho, i as u8, j as u8);
                entries.push(sample_uniform(&mut xof));
            }
        }
        Matrix::new(k, l, entries)
    }
}
