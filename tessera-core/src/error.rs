//! Error types for Tessera verification.

use core::fmt;

/// Result type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Fatal errors raised while verifying a signature.
///
/// None of these variants means "the signature is invalid". They describe a
/// defect in the caller's inputs or configuration, or a broken ring-arithmetic
/// backend, and must be surfaced rather than folded into a negative verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid public key length provided.
    InvalidKeyLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length provided.
        actual: usize,
    },

    /// Context string longer than 255 bytes.
    ContextTooLong {
        /// Length of the rejected context.
        actual: usize,
    },

    /// `gamma1` is neither 2^17 nor 2^19.
    UnsupportedGamma1 {
        /// The rejected value.
        gamma1: i32,
    },

    /// `gamma2` is neither (q-1)/88 nor (q-1)/32.
    UnsupportedGamma2 {
        /// The rejected value.
        gamma2: i32,
    },

    /// A precomputed matrix does not match the parameter set's k×l shape.
    MatrixShape {
        /// Expected (rows, columns).
        expected: (usize, usize),
        /// Actual (rows, columns).
        actual: (usize, usize),
    },

    /// Encoding or decoding error in caller-supplied key material.
    EncodingError,

    /// The ring-arithmetic backend failed.
    Engine(EngineFailure),

    /// Parameter set not supported.
    UnsupportedParameterSet,

    /// A public key parsed for one parameter set was used with another.
    ParameterMismatch,
}

/// Ways an out-of-process ring engine can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineFailure {
    /// The transport reported a failed call.
    Transport,

    /// The response had the wrong number of bytes.
    ResponseLength {
        /// Expected length in bytes.
        expected: usize,
        /// Actual length returned.
        actual: usize,
    },

    /// A response coefficient could not be canonicalised into `[0, q)`.
    CoefficientOutOfRange {
        /// Coefficient index within the polynomial.
        index: usize,
        /// The raw signed value received.
        value: i32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidKeyLength { expected, actual } => {
                write!(f, "invalid key length: expected {expected}, got {actual}")
            }
            Error::ContextTooLong { actual } => {
                write!(f, "context too long: {actual} bytes (maximum 255)")
            }
            Error::UnsupportedGamma1 { gamma1 } => {
                write!(f, "unsupported gamma1 {gamma1}: expected 2^17 or 2^19")
            }
            Error::UnsupportedGamma2 { gamma2 } => {
                write!(f, "unsupported gamma2 {gamma2}: expected (q-1)/88 or (q-1)/32")
            }
            Error::MatrixShape { expected, actual } => {
                write!(
                    f,
                    "matrix shape mismatch: expected {}x{}, got {}x{}",
                    expected.0, expected.1, actual.0, actual.1
                )
            }
            Error::EncodingError => write!(f, "encoding or decoding error"),
            Error::Engine(failure) => write!(f, "ring engine failure: {failure}"),
            Error::UnsupportedParameterSet => write!(f, "unsupported parameter set"),
            Error::ParameterMismatch => {
                write!(f, "public key belongs to a different parameter set")
            }
        }
    }
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineFailure::Transport => write!(f, "transport call failed"),
            EngineFailure::ResponseLength { expected, actual } => {
                write!(
                    f,
                    "response length: expected {expected} bytes, got {actual}"
                )
            }
            EngineFailure::CoefficientOutOfRange { index, value } => {
                write!(f, "coefficient {index} out of range: {value}")
            }
        }
    }
}

impl From<EngineFailure> for Error {
    fn from(failure: EngineFailure) -> Self {
        Error::Engine(failure)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for EngineFailure {}
