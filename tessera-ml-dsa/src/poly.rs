//! Polynomials, polynomial vectors and the public matrix
//!
//! Polynomials are elements of the ring R_q = Z_q[X] / (X^256 + 1)
//! where q = 8380417. Every coefficient held by a [`Poly`] is a canonical
//! residue in [0, q). Whether the coefficients are plain values or NTT
//! evaluations is tracked by the type parameter, not at runtime.

use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::packing::{BitReader, BitWriter};
use crate::reduce::{centered_abs, Q};
use tessera_core::{Error, Result};

/// Ring dimension N = 256
pub const N: usize = 256;

/// Bits per coefficient in the compact matrix encoding.
pub const COMPACT_COEFF_BITS: u32 = 23;

/// Bytes per polynomial in the compact matrix encoding.
pub const COMPACT_POLY_BYTES: usize = N * COMPACT_COEFF_BITS as usize / 8;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Standard {}
    impl Sealed for super::Ntt {}
}

/// Representation domain of a polynomial.
pub trait Domain: sealed::Sealed + Copy + Default + core::fmt::Debug + Eq + 'static {}

/// Coefficient representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Standard;

/// NTT evaluation representation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ntt;

impl Domain for Standard {}
impl Domain for Ntt {}

/// A polynomial with 256 canonical coefficients in domain `D`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poly<D: Domain> {
    coeffs: [i32; N],
    _domain: PhantomData<D>,
}

impl<D: Domain> Default for Poly<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<D: Domain> Poly<D> {
    /// The zero polynomial.
    #[inline]
    pub const fn zero() -> Self {
        Self::from_raw([0; N])
    }

    /// Build a polynomial from arbitrary integers, reducing each mod q.
    pub fn from_coeffs(coeffs: [i32; N]) -> Self {
        Self::from_raw(coeffs.map(|c| c.rem_euclid(Q)))
    }

    /// Build a polynomial from coefficients that must already be in [0, q).
    ///
    /// Returns `None` if any coefficient is out of range.
    pub fn from_canonical(coeffs: [i32; N]) -> Option<Self> {
        if coeffs.iter().all(|&c| (0..Q).contains(&c)) {
            Some(Self::from_raw(coeffs))
        } else {
            None
        }
    }

    /// Caller guarantees every coefficient is in [0, q).
    #[inline]
    pub(crate) const fn from_raw(coeffs: [i32; N]) -> Self {
        Self {
            coeffs,
            _domain: PhantomData,
        }
    }

    /// Canonical coefficients.
    #[inline]
    pub fn coeffs(&self) -> &[i32; N] {
        &self.coeffs
    }

    /// Consume the polynomial and return its coefficients.
    #[inline]
    pub fn into_coeffs(self) -> [i32; N] {
        self.coeffs
    }

    /// Number of nonzero coefficients.
    pub fn count_nonzero(&self) -> usize {
        self.coeffs.iter().filter(|&&c| c != 0).count()
    }

    /// Infinity norm with coefficients read as centered representatives.
    pub fn norm_inf(&self) -> i32 {
        self.coeffs.iter().map(|&c| centered_abs(c)).max().unwrap_or(0)
    }
}

impl<D: Domain> core::ops::Index<usize> for Poly<D> {
    type Output = i32;

    fn index(&self, i: usize) -> &Self::Output {
        &self.coeffs[i]
    }
}

/// An owned vector of polynomials in one domain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolyVec<D: Domain> {
    polys: Vec<Poly<D>>,
}

impl<D: Domain> PolyVec<D> {
    /// Vector of `len` zero polynomials.
    pub fn zero(len: usize) -> Self {
        Self {
            polys: (0..len).map(|_| Poly::zero()).collect(),
        }
    }

    /// Wrap existing polynomials.
    pub fn new(polys: Vec<Poly<D>>) -> Self {
        Self { polys }
    }

    /// Number of polynomials.
    pub fn len(&self) -> usize {
        self.polys.len()
    }

    /// True if the vector holds no polynomials.
    pub fn is_empty(&self) -> bool {
        self.polys.is_empty()
    }

    /// Borrow the polynomials.
    pub fn as_slice(&self) -> &[Poly<D>] {
        &self.polys
    }

    /// Iterate over the polynomials.
    pub fn iter(&self) -> core::slice::Iter<'_, Poly<D>> {
        self.polys.iter()
    }

    /// Consume into the inner vector.
    pub fn into_inner(self) -> Vec<Poly<D>> {
        self.polys
    }

    /// Largest centered coefficient magnitude across all polynomials.
    pub fn norm_inf(&self) -> i32 {
        self.polys.iter().map(Poly::norm_inf).max().unwrap_or(0)
    }
}

impl<D: Domain> core::ops::Index<usize> for PolyVec<D> {
    type Output = Poly<D>;

    fn index(&self, i: usize) -> &Self::Output {
        &self.polys[i]
    }
}

impl<D: Domain> FromIterator<Poly<D>> for PolyVec<D> {
    fn from_iter<I: IntoIterator<Item = Poly<D>>>(iter: I) -> Self {
        Self {
            polys: iter.into_iter().collect(),
        }
    }
}

impl<'a, D: Domain> IntoIterator for &'a PolyVec<D> {
    type Item = &'a Poly<D>;
    type IntoIter = core::slice::Iter<'a, Poly<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.polys.iter()
    }
}

/// The public matrix A: k rows by l columns of NTT-domain polynomials,
/// stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    entries: Vec<Poly<Ntt>>,
}

impl Matrix {
    /// Build a matrix from row-major entries.
    pub fn new(rows: usize, cols: usize, entries: Vec<Poly<Ntt>>) -> Result<Self> {
        if entries.len() != rows * cols || rows == 0 || cols == 0 {
            return Err(Error::MatrixShape {
                expected: (rows, cols),
                actual: (entries.len() / cols.max(1), cols),
            });
        }
        Ok(Self {
            rows,
            cols,
            entries,
        })
    }

    /// (rows, cols).
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Fail with [`Error::MatrixShape`] unless the matrix is k×l.
    pub fn check_shape(&self, k: usize, l: usize) -> Result<()> {
        if self.shape() == (k, l) {
            Ok(())
        } else {
            Err(Error::MatrixShape {
                expected: (k, l),
                actual: self.shape(),
            })
        }
    }

    /// Entry A[i][j].
    pub fn get(&self, i: usize, j: usize) -> &Poly<Ntt> {
        &self.entries[i * self.cols + j]
    }

    /// Row i as a slice of l polynomials.
    pub fn row(&self, i: usize) -> &[Poly<Ntt>] {
        &self.entries[i * self.cols..(i + 1) * self.cols]
    }

    /// Encode with 23 bits per coefficient, row-major, LSB first.
    pub fn to_compact_bytes(&self) -> Vec<u8> {
        let mut writer = BitWriter::with_capacity(self.entries.len() * COMPACT_POLY_BYTES);
        for poly in &self.entries {
            for &c in poly.coeffs() {
                writer.write(c as u32, COMPACT_COEFF_BITS);
            }
        }
        writer.finish()
    }

    /// Decode the compact encoding of a `rows`×`cols` matrix.
    ///
    /// Fails with [`Error::EncodingError`] on a length mismatch or on any
    /// coefficient that is not a canonical residue.
    pub fn from_compact_bytes(bytes: &[u8], rows: usize, cols: usize) -> Result<Self> {
        if bytes.len() != rows * cols * COMPACT_POLY_BYTES {
            return Err(Error::EncodingError);
        }
        let mut reader = BitReader::new(bytes);
        let mut entries = Vec::with_capacity(rows * cols);
        for _ in 0..rows * cols {
            let mut coeffs = [0i32; N];
            for c in &mut coeffs {
                *c = reader.read(COMPACT_COEFF_BITS).ok_or(Error::EncodingError)? as i32;
            }
            entries.push(Poly::from_canonical(coeffs).ok_or(Error::EncodingError)?);
        }
        Self::new(rows, cols, entries)
    }
}
