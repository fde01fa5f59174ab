//! Bit packing for keys, signatures and the high-bits commitment
//!
//! Every ML-DSA encoding is a little-endian bitstream: values are written
//! LSB first, each byte filled from its lowest bit. [`BitReader`] and
//! [`BitWriter`] keep an integer bit cursor instead of per-width byte
//! shuffles.

use alloc::vec::Vec;

use crate::poly::{Poly, PolyVec, Standard, N};
use crate::reduce::Q;
use tessera_core::{Error, Result};

/// Bits per t1 coefficient.
pub const T1_BITS: u32 = 10;

/// Reads fixed-width unsigned values from a byte slice, LSB first.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Start reading at bit 0.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, bit_pos: 0 }
    }

    /// Read the next `bits` (at most 32) bits. Returns `None` once the
    /// input is exhausted.
    pub fn read(&mut self, bits: u32) -> Option<u32> {
        debug_assert!(bits <= 32);
        let mut value = 0u32;
        let mut filled = 0u32;

        while filled < bits {
            let byte = *self.bytes.get(self.bit_pos / 8)?;
            let offset = (self.bit_pos % 8) as u32;
            let take = (8 - offset).min(bits - filled);
            let chunk = (u32::from(byte) >> offset) & ((1u32 << take) - 1);
            value |= chunk << filled;
            filled += take;
            self.bit_pos += take as usize;
        }

        Some(value)
    }

    /// Bits not yet consumed.
    pub fn remaining_bits(&self) -> usize {
        self.bytes.len() * 8 - self.bit_pos
    }
}

/// Appends fixed-width unsigned values to a growing buffer, LSB first.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_pos: usize,
}

impl BitWriter {
    /// Empty writer with room for `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            bit_pos: 0,
        }
    }

    /// Append the low `bits` (at most 32) bits of `value`.
    pub fn write(&mut self, value: u32, bits: u32) {
        debug_assert!(bits <= 32);
        let mut written = 0u32;

        while written < bits {
            let offset = (self.bit_pos % 8) as u32;
            if offset == 0 {
                self.bytes.push(0);
            }
            let take = (8 - offset).min(bits - written);
            let chunk = (value >> written) & ((1u32 << take) - 1);
            if let Some(last) = self.bytes.last_mut() {
                *last |= (chunk << offset) as u8;
            }
            written += take;
            self.bit_pos += take as usize;
        }
    }

    /// Finish and return the packed bytes. A partial last byte is
    /// zero-padded.
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// Unpack one t1 polynomial (10 bits per coefficient).
pub fn unpack_t1(bytes: &[u8]) -> Result<Poly<Standard>> {
    if bytes.len() != N * T1_BITS as usize / 8 {
        return Err(Error::EncodingError);
    }
    let mut reader = BitReader::new(bytes);
    let mut coeffs = [0i32; N];
    for c in &mut coeffs {
        *c = reader.read(T1_BITS).ok_or(Error::EncodingError)? as i32;
    }
    // 10-bit values are always below q.
    Ok(Poly::from_raw(coeffs))
}

/// Pack one t1 polynomial (coefficients must be below 2^10).
pub fn pack_t1(poly: &Poly<Standard>) -> Vec<u8> {
    let mut writer = BitWriter::with_capacity(N * T1_BITS as usize / 8);
    for &c in poly.coeffs() {
        writer.write(c as u32, T1_BITS);
    }
    writer.finish()
}

/// Pack the high-bits vector w1 with `bits` (4 or 6) bits per coefficient.
pub fn pack_w1(w1: &[Poly<Standard>], bits: u32) -> Vec<u8> {
    let mut writer = BitWriter::with_capacity(w1.len() * N * bits as usize / 8);
    for poly in w1 {
        for &c in poly.coeffs() {
            writer.write(c as u32, bits);
        }
    }
    writer.finish()
}

/// Pack a response vector whose centered coefficients lie in
/// (-gamma1, gamma1], `bits` bits per coefficient.
///
/// Each coefficient is stored as gamma1 - z.
pub fn pack_response(z: &PolyVec<Standard>, gamma1: i32, bits: u32) -> Vec<u8> {
    let mut writer = BitWriter::with_capacity(z.len() * N * bits as usize / 8);
    for poly in z {
        for &c in poly.coeffs() {
            let centered = if c > (Q - 1) / 2 { c - Q } else { c };
            writer.write((gamma1 - centered) as u32, bits);
        }
    }
    writer.finish()
}
