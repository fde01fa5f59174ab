//! Signature decoding with structural validation
//!
//! A malformed hint or an out-of-bound response coefficient makes the
//! signature invalid; it is reported as `None`, never as an error. Only a
//! parameter set the decoder cannot handle at all is an `Err`.

use alloc::vec::Vec;

use crate::packing::BitReader;
use crate::params::ParameterSet;
use crate::poly::{Poly, PolyVec, Standard, N};
use crate::reduce::{centered_abs, Q};
use tessera_core::Result;
use tracing::debug;

/// Hint bits: a k×256 bit matrix with at most omega bits set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    rows: Vec<[u64; N / 64]>,
    popcount: usize,
}

impl Hint {
    /// All-zero hint with `k` rows.
    pub fn empty(k: usize) -> Self {
        Self {
            rows: alloc::vec![[0u64; N / 64]; k],
            popcount: 0,
        }
    }

    /// Number of rows (k).
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Total number of set bits.
    pub fn popcount(&self) -> usize {
        self.popcount
    }

    /// Bit at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        (self.rows[row][col / 64] >> (col % 64)) & 1 == 1
    }

    /// Set the bit at (row, col).
    pub fn set(&mut self, row: usize, col: usize) {
        let word = &mut self.rows[row][col / 64];
        let mask = 1u64 << (col % 64);
        if *word & mask == 0 {
            *word |= mask;
            self.popcount += 1;
        }
    }

    /// Encode as omega index slots followed by k row boundaries.
    ///
    /// Returns `None` if more than omega bits are set.
    pub fn to_bytes(&self, omega: usize) -> Option<Vec<u8>> {
        if self.popcount > omega {
            return None;
        }
        let k = self.rows.len();
        let mut out = alloc::vec![0u8; omega + k];
        let mut cursor = 0;
        for row in 0..k {
            for col in 0..N {
                if self.get(row, col) {
                    out[cursor] = col as u8;
                    cursor += 1;
                }
            }
            out[omega + row] = cursor as u8;
        }
        Some(out)
    }
}

/// Decode a packed hint: `omega` index bytes then `k` boundary bytes.
///
/// Returns `None` on a wrong length or any structural violation.
pub fn unpack_hint(bytes: &[u8], k: usize, omega: usize) -> Option<Hint> {
    if bytes.len() != omega + k {
        debug!(len = bytes.len(), expected = omega + k, "hint has wrong length");
        return None;
    }
    let (slots, boundaries) = bytes.split_at(omega);
    let slots: Vec<u16> = slots.iter().map(|&b| u16::from(b)).collect();
    let boundaries: Vec<u16> = boundaries.iter().map(|&b| u16::from(b)).collect();
    unpack_hint_slots(&slots, &boundaries, omega)
}

/// Decode a hint from widened index slots and row boundaries.
///
/// Hosts that keep hint slots unpacked can call this directly; the checks
/// are the same as for the byte encoding, including the index range check
/// that the byte encoding cannot trip.
pub fn unpack_hint_slots(slots: &[u16], boundaries: &[u16], omega: usize) -> Option<Hint> {
    let mut hint = Hint::empty(boundaries.len());
    let mut cursor = 0usize;

    for (row, &boundary) in boundaries.iter().enumerate() {
        let boundary = usize::from(boundary);
        if boundary < cursor || boundary > omega {
            debug!(row, boundary, cursor, omega, "hint row boundary out of order");
            return None;
        }

        for j in cursor..boundary {
            let index = usize::from(*slots.get(j)?);
            if j > cursor && index <= usize::from(slots[j - 1]) {
                debug!(row, slot = j, "hint indices not strictly increasing");
                return None;
            }
            if index >= N {
                debug!(row, slot = j, index, "hint index out of range");
                return None;
            }
            hint.set(row, index);
        }
        cursor = boundary;
    }

    let trailing = slots.get(cursor..omega.min(slots.len()))?;
    if trailing.iter().any(|&s| s != 0) {
        debug!(cursor, "hint has non-zero trailing slots");
        return None;
    }

    Some(hint)
}

/// Map a packed response value back to a canonical coefficient:
/// z = gamma1 - altered, taken mod q.
#[inline]
pub(crate) fn response_from_altered(altered: i32, gamma1: i32) -> i32 {
    if altered < gamma1 {
        gamma1 - altered
    } else {
        Q + gamma1 - altered
    }
}

/// Decode the response vector z and check ‖z‖∞ ≤ gamma1 - beta in the
/// same pass.
///
/// `Ok(None)` means the signature is invalid (wrong length or a
/// coefficient over the bound). `Err` means gamma1 is unsupported.
pub fn unpack_response(bytes: &[u8], params: &ParameterSet) -> Result<Option<PolyVec<Standard>>> {
    let bits = params.z_bits()?;
    let expected = params.l * N * bits as usize / 8;
    if bytes.len() != expected {
        debug!(len = bytes.len(), expected, "response has wrong length");
        return Ok(None);
    }

    let bound = params.z_bound();
    let mut reader = BitReader::new(bytes);
    let mut polys = Vec::with_capacity(params.l);

    for poly_index in 0..params.l {
        let mut coeffs = [0i32; N];
        for (i, c) in coeffs.iter_mut().enumerate() {
            let Some(altered) = reader.read(bits) else {
                return Ok(None);
            };
            let z = response_from_altered(altered as i32, params.gamma1);
            if centered_abs(z) > bound {
                debug!(poly = poly_index, coeff = i, bound, "response coefficient exceeds bound");
                return Ok(None);
            }
            *c = z;
        }
        polys.push(Poly::from_raw(coeffs));
    }

    Ok(Some(PolyVec::new(polys)))
}
