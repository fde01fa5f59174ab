//! ML-DSA (FIPS 204) signature verification
//!
//! A verification-only implementation of ML-DSA with a pluggable
//! ring-arithmetic backend. Polynomial arithmetic runs either in process
//! ([`SoftwareEngine`]) or on an external accelerator reached through a
//! [`Transport`] ([`AcceleratorEngine`]); the verifier cannot tell the
//! difference.
//!
//! # Supported Parameter Sets
//!
//! | Variant | Security Level | Public Key | Signature |
//! |---------|----------------|------------|-----------|
//! | ML-DSA-44 | Level 2 | 1,312 bytes | 2,420 bytes |
//! | ML-DSA-65 | Level 3 | 1,952 bytes | 3,309 bytes |
//! | ML-DSA-87 | Level 5 | 2,592 bytes | 4,627 bytes |
//!
//! # Outcomes
//!
//! `Ok(true)` accepts, `Ok(false)` rejects. `Err` is never a verdict on
//! the signature: it reports an oversized context, a malformed public key,
//! an unsupported parameter set or a failing ring engine.
//!
//! # Example
//!
//! ```ignore
//! use tessera_ml_dsa::{Verifier, ML_DSA_65};
//!
//! let verifier = Verifier::new(ML_DSA_65)?;
//! let pk = verifier.public_key(&pk_bytes)?;
//! assert!(verifier.verify(&pk, b"message", &signature, b"")?);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

extern crate alloc;

pub mod accelerator;
pub mod decode;
pub mod engine;
pub mod expand;
pub mod hash;
mod key;
pub mod ntt;
pub mod packing;
pub mod params;
pub mod poly;
pub mod reduce;
pub mod rounding;
pub mod sample;
mod verify;

#[cfg(test)]
mod testing;

pub use accelerator::{AcceleratorEngine, RingOp, Transport};
pub use decode::{unpack_hint, unpack_response, Hint};
pub use engine::{RingEngine, SoftwareEngine};
pub use expand::{MatrixProvider, ShakeExpander};
pub use key::PublicKey;
pub use params::{ParameterSet, ML_DSA_44, ML_DSA_65, ML_DSA_87};
pub use poly::{Domain, Matrix, Ntt, Poly, PolyVec, Standard, N};
pub use sample::sample_in_ball;
pub use verify::{DecodedSignature, Verifier};

pub use tessera_core::{EngineFailure, Error, Result, SignatureVerifier, MAX_CONTEXT_LEN};
