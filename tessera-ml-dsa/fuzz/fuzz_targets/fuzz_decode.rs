//! Fuzz target for signature decoding.
//!
//! Stage 1 must never panic, and anything it accepts must satisfy the
//! invariants the rest of verification relies on.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use tessera_ml_dsa::params::ALL;
use tessera_ml_dsa::{unpack_hint, unpack_response, Verifier};

#[derive(Debug, Arbitrary)]
struct DecodeInput {
    variant: u8,
    data: Vec<u8>,
}

fuzz_target!(|input: DecodeInput| {
    let params = ALL[usize::from(input.variant) % ALL.len()];

    if let Some(hint) = unpack_hint(&input.data, params.k, params.omega) {
        assert!(hint.popcount() <= params.omega);
        assert_eq!(hint.rows(), params.k);
    }

    if let Ok(Some(z)) = unpack_response(&input.data, &params) {
        assert_eq!(z.len(), params.l);
        assert!(z.norm_inf() <= params.z_bound());
    }

    let verifier = Verifier::new(params).expect("built-in parameter set");
    let mut sig = input.data;
    sig.resize(params.signature_bytes(), 0);
    if let Some(decoded) = verifier.decode_and_check(&sig).expect("supported gamma1") {
        assert_eq!(decoded.c_tilde.len(), params.c_tilde_bytes);
        assert!(decoded.z.norm_inf() <= params.z_bound());
        assert!(decoded.hint.popcount() <= params.omega);
    }
});
