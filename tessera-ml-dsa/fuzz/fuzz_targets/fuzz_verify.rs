//! Fuzz target for ML-DSA verification.
//!
//! Verify must not panic on malformed input, and with a well-formed public
//! key and a context of at most 255 bytes it must return `Ok`.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use tessera_ml_dsa::params::ALL;
use tessera_ml_dsa::{Error, Verifier, MAX_CONTEXT_LEN};

#[derive(Debug, Arbitrary)]
struct VerifyInput {
    variant: u8,
    public_key: Vec<u8>,
    message: Vec<u8>,
    signature: Vec<u8>,
    context: Vec<u8>,
    pad_signature: bool,
}

fuzz_target!(|input: VerifyInput| {
    if input.message.len() > 10000 {
        return;
    }

    let params = ALL[usize::from(input.variant) % ALL.len()];
    let verifier = Verifier::new(params).expect("built-in parameter set");

    let mut pk_bytes = input.public_key;
    pk_bytes.resize(params.public_key_bytes(), 0);
    let pk = verifier.public_key(&pk_bytes).expect("any correctly sized key parses");

    let mut signature = input.signature;
    if input.pad_signature {
        signature.resize(params.signature_bytes(), 0);
    }

    match verifier.verify(&pk, &input.message, &signature, &input.context) {
        Ok(_) => assert!(input.context.len() <= MAX_CONTEXT_LEN),
        Err(Error::ContextTooLong { actual }) => assert!(actual > MAX_CONTEXT_LEN),
        Err(e) => panic!("unexpected error: {e:?}"),
    }
});
