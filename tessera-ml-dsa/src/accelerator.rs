//! Out-of-process ring engine and its wire format
//!
//! Request layout, all big-endian:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | ring degree (256) |
//! | 4 | 8 | modulus (8380417) |
//! | 12 | 1024 × arity | operands as signed 32-bit coefficients |
//!
//! The response is exactly 1024 bytes of signed 32-bit coefficients. A
//! negative coefficient is canonicalized by adding q once; anything outside
//! (-q, q) cannot be fixed that way and is treated as an engine failure.

use alloc::vec::Vec;

use crate::engine::RingEngine;
use crate::poly::{Domain, Ntt, Poly, Standard, N};
use crate::reduce::{canonicalize, Q};
use tessera_core::{EngineFailure, Error, Result};
use tracing::warn;

/// Size of the request header.
pub const HEADER_BYTES: usize = 12;

/// Size of one encoded polynomial.
pub const POLY_WIRE_BYTES: usize = 4 * N;

/// Operation selector passed alongside each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingOp {
    /// Standard to NTT domain.
    ForwardNtt,
    /// NTT to standard domain.
    InverseNtt,
    /// Elementwise product.
    PointwiseMul,
    /// Elementwise sum.
    PointwiseAdd,
    /// Elementwise difference.
    PointwiseSub,
}

impl RingOp {
    /// Number of polynomial operands the request carries.
    pub const fn arity(self) -> usize {
        match self {
            RingOp::ForwardNtt | RingOp::InverseNtt => 1,
            RingOp::PointwiseMul | RingOp::PointwiseAdd | RingOp::PointwiseSub => 2,
        }
    }

    /// Encoded request length for this operation.
    pub const fn request_len(self) -> usize {
        HEADER_BYTES + self.arity() * POLY_WIRE_BYTES
    }
}

/// Carries an encoded request to the accelerator and returns its raw
/// response.
pub trait Transport {
    /// Transport-level error.
    type Error: core::fmt::Debug;

    /// Perform one synchronous request/response exchange.
    fn call(&self, op: RingOp, request: &[u8]) -> core::result::Result<Vec<u8>, Self::Error>;
}

/// Encode a request carrying `operands` (one or two polynomials).
pub fn encode_request(operands: &[&[i32; N]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_BYTES + operands.len() * POLY_WIRE_BYTES);
    out.extend_from_slice(&(N as u32).to_be_bytes());
    out.extend_from_slice(&(Q as u64).to_be_bytes());
    for poly in operands {
        for c in poly.iter() {
            out.extend_from_slice(&c.to_be_bytes());
        }
    }
    out
}

/// Decode a request on the serving side.
///
/// Checks the header and the operand count for `op`; operands are returned
/// as sent, without canonicalization.
pub fn decode_request(op: RingOp, request: &[u8]) -> Result<Vec<[i32; N]>> {
    if request.len() != op.request_len() {
        return Err(Error::EncodingError);
    }
    let (header, body) = request.split_at(HEADER_BYTES);
    let degree = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    let mut modulus = [0u8; 8];
    modulus.copy_from_slice(&header[4..]);
    if degree as usize != N || u64::from_be_bytes(modulus) != Q as u64 {
        return Err(Error::EncodingError);
    }

    Ok(body
        .chunks_exact(POLY_WIRE_BYTES)
        .map(|chunk| {
            let mut coeffs = [0i32; N];
            for (c, b) in coeffs.iter_mut().zip(chunk.chunks_exact(4)) {
                *c = i32::from_be_bytes([b[0], b[1], b[2], b[3]]);
            }
            coeffs
        })
        .collect())
}

/// Encode a response on the serving side.
pub fn encode_response(coeffs: &[i32; N]) -> Vec<u8> {
    coeffs.iter().flat_map(|c| c.to_be_bytes()).collect()
}

/// Decode and canonicalize an accelerator response.
pub fn decode_response(response: &[u8]) -> core::result::Result<[i32; N], EngineFailure> {
    if response.len() != POLY_WIRE_BYTES {
        return Err(EngineFailure::ResponseLength {
            expected: POLY_WIRE_BYTES,
            actual: response.len(),
        });
    }

    let mut coeffs = [0i32; N];
    for (index, (c, b)) in coeffs.iter_mut().zip(response.chunks_exact(4)).enumerate() {
        let value = i32::from_be_bytes([b[0], b[1], b[2], b[3]]);
        *c = canonicalize(value).ok_or(EngineFailure::CoefficientOutOfRange { index, value })?;
    }
    Ok(coeffs)
}

/// Ring engine that delegates every operation to an external accelerator.
#[derive(Debug, Clone, Default)]
pub struct AcceleratorEngine<T> {
    transport: T,
}

impl<T: Transport> AcceleratorEngine<T> {
    /// Wrap a transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn run<D: Domain>(&self, op: RingOp, operands: &[&[i32; N]]) -> Result<Poly<D>> {
        let request = encode_request(operands);
        let response = self.transport.call(op, &request).map_err(|e| {
            warn!(?op, error = ?e, "ring accelerator transport failed");
            EngineFailure::Transport
        })?;
        let coeffs = decode_response(&response).map_err(|failure| {
            warn!(?op, %failure, "ring accelerator returned a malformed response");
            failure
        })?;
        Ok(Poly::from_raw(coeffs))
    }
}

impl<T: Transport> RingEngine for AcceleratorEngine<T> {
    fn forward_ntt(&self, a: &Poly<Standard>) -> Result<Poly<Ntt>> {
        self.run(RingOp::ForwardNtt, &[a.coeffs()])
    }

    fn inverse_ntt(&self, a: &Poly<Ntt>) -> Result<Poly<Standard>> {
        self.run(RingOp::InverseNtt, &[a.coeffs()])
    }

    fn pointwise_mul<D: Domain>(&self, a: &Poly<D>, b: &Poly<D>) -> Result<Poly<D>> {
        self.run(RingOp::PointwiseMul, &[a.coeffs(), b.coeffs()])
    }

    fn pointwise_add<D: Domain>(&self, a: &Poly<D>, b: &Poly<D>) -> Result<Poly<D>> {
        self.run(RingOp::PointwiseAdd, &[a.coeffs(), b.coeffs()])
    }

    fn pointwise_sub<D: Domain>(&self, a: &Poly<D>, b: &Poly<D>) -> Result<Poly<D>> {
        self.run(RingOp::PointwiseSub, &[a.coeffs(), b.coeffs()])
    }
}
