//! Ring engine: NTT and pointwise arithmetic behind one interface
//!
//! A [`RingEngine`] takes and returns canonical polynomials. The verifier is
//! written against the trait only, so the in-process [`SoftwareEngine`] and
//! an out-of-process [`AcceleratorEngine`](crate::AcceleratorEngine) are
//! interchangeable.

use alloc::vec::Vec;

use crate::ntt::{inv_ntt, ntt};
use crate::poly::{Domain, Matrix, Ntt, Poly, PolyVec, Standard};
use crate::reduce::{caddq, freeze, mul_mod, Q};
use tessera_core::{Error, Result};

/// Primitive operations on 256-coefficient polynomials mod q.
///
/// Inputs and outputs are always canonical. Pointwise operations work in
/// either domain; the type system keeps both operands in the same one.
/// Any `Err` is an engine failure and must not be read as a verdict on the
/// signature being checked.
pub trait RingEngine {
    /// Standard to NTT domain.
    fn forward_ntt(&self, a: &Poly<Standard>) -> Result<Poly<Ntt>>;

    /// NTT to standard domain.
    fn inverse_ntt(&self, a: &Poly<Ntt>) -> Result<Poly<Standard>>;

    /// Elementwise a * b mod q.
    fn pointwise_mul<D: Domain>(&self, a: &Poly<D>, b: &Poly<D>) -> Result<Poly<D>>;

    /// Elementwise a + b mod q.
    fn pointwise_add<D: Domain>(&self, a: &Poly<D>, b: &Poly<D>) -> Result<Poly<D>>;

    /// Elementwise a - b mod q.
    fn pointwise_sub<D: Domain>(&self, a: &Poly<D>, b: &Poly<D>) -> Result<Poly<D>>;

    /// Forward NTT of every polynomial in a vector.
    fn forward_ntt_vec(&self, v: &PolyVec<Standard>) -> Result<PolyVec<Ntt>> {
        v.iter().map(|p| self.forward_ntt(p)).collect()
    }

    /// Inverse NTT of every polynomial in a vector.
    fn inverse_ntt_vec(&self, v: &PolyVec<Ntt>) -> Result<PolyVec<Standard>> {
        v.iter().map(|p| self.inverse_ntt(p)).collect()
    }

    /// Matrix-vector product A * v in the NTT domain, accumulated row by
    /// row with `pointwise_mul` and `pointwise_add`.
    fn matrix_vec_mul(&self, a: &Matrix, v: &PolyVec<Ntt>) -> Result<PolyVec<Ntt>> {
        let (rows, cols) = a.shape();
        if v.len() != cols {
            return Err(Error::MatrixShape {
                expected: (rows, v.len()),
                actual: (rows, cols),
            });
        }

        let mut out = Vec::with_capacity(rows);
        for i in 0..rows {
            let mut acc = Poly::zero();
            for (aij, vj) in a.row(i).iter().zip(v.iter()) {
                let prod = self.pointwise_mul(aij, vj)?;
                acc = self.pointwise_add(&acc, &prod)?;
            }
            out.push(acc);
        }
        Ok(PolyVec::new(out))
    }
}

impl<E: RingEngine + ?Sized> RingEngine for &E {
    fn forward_ntt(&self, a: &Poly<Standard>) -> Result<Poly<Ntt>> {
        (**self).forward_ntt(a)
    }

    fn inverse_ntt(&self, a: &Poly<Ntt>) -> Result<Poly<Standard>> {
        (**self).inverse_ntt(a)
    }

    fn pointwise_mul<D: Domain>(&self, a: &Poly<D>, b: &Poly<D>) -> Result<Poly<D>> {
        (**self).pointwise_mul(a, b)
    }

    fn pointwise_add<D: Domain>(&self, a: &Poly<D>, b: &Poly<D>) -> Result<Poly<D>> {
        (**self).pointwise_add(a, b)
    }

    fn pointwise_sub<D: Domain>(&self, a: &Poly<D>, b: &Poly<D>) -> Result<Poly<D>> {
        (**self).pointwise_sub(a, b)
    }
}

/// In-process Montgomery arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoftwareEngine;

impl SoftwareEngine {
    /// Create the software engine.
    pub const fn new() -> Self {
        Self
    }
}

#[inline]
fn map2<D: Domain>(a: &Poly<D>, b: &Poly<D>, f: impl Fn(i32, i32) -> i32) -> Poly<D> {
    let (a, b) = (a.coeffs(), b.coeffs());
    Poly::from_raw(core::array::from_fn(|i| f(a[i], b[i])))
}

impl RingEngine for SoftwareEngine {
    fn forward_ntt(&self, a: &Poly<Standard>) -> Result<Poly<Ntt>> {
        let mut c = *a.coeffs();
        ntt(&mut c);
        Ok(Poly::from_raw(c.map(freeze)))
    }

    fn inverse_ntt(&self, a: &Poly<Ntt>) -> Result<Poly<Standard>> {
        let mut c = *a.coeffs();
        inv_ntt(&mut c);
        Ok(Poly::from_raw(c.map(caddq)))
    }

    fn pointwise_mul<D: Domain>(&self, a: &Poly<D>, b: &Poly<D>) -> Result<Poly<D>> {
        Ok(map2(a, b, |x, y| caddq(mul_mod(x, y))))
    }

    fn pointwise_add<D: Domain>(&self, a: &Poly<D>, b: &Poly<D>) -> Result<Poly<D>> {
        Ok(map2(a, b, |x, y| caddq(x + y - Q)))
    }

    fn pointwise_sub<D: Domain>(&self, a: &Poly<D>, b: &Poly<D>) -> Result<Poly<D>> {
        Ok(map2(a, b, |x, y| caddq(x - y)))
    }
}
