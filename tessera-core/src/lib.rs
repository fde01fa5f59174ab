//! # Tessera Core
//!
//! Shared building blocks for the Tessera ML-DSA verification library.
//!
//! This crate provides:
//! - The error type shared by every verification backend
//! - The [`SignatureVerifier`] trait implemented by parameterised verifiers
//!
//! Verification outcomes are split in two. A signature that fails any
//! structural or cryptographic check is an ordinary `Ok(false)`; an [`Error`]
//! always means the caller or the environment is at fault (bad configuration,
//! oversized context, failing ring-arithmetic backend).

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod traits;

pub use error::{EngineFailure, Error, Result};
pub use traits::{SignatureVerifier, MAX_CONTEXT_LEN};
