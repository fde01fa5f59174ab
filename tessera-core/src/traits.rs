//! Verifier trait.

use crate::Result;

/// Longest context string accepted by the pure ML-DSA interface.
pub const MAX_CONTEXT_LEN: usize = 255;

/// Digital signature verification.
///
/// Implementations bind a parameter set at construction, so the sizes below
/// are per-instance rather than associated constants.
///
/// # Example
///
/// ```ignore
/// use tessera_core::SignatureVerifier;
///
/// let verifier = Verifier::new(ML_DSA_44)?;
/// let pk = verifier.public_key(&pk_bytes)?;
/// if verifier.verify(&pk, message, &signature, b"")? {
///     // accepted
/// }
/// ```
pub trait SignatureVerifier {
    /// Parsed verification (public) key.
    type PublicKey;

    /// Size of an encoded public key in bytes.
    fn public_key_size(&self) -> usize;

    /// Size of an encoded signature in bytes.
    fn signature_size(&self) -> usize;

    /// Parse an encoded public key.
    fn public_key(&self, bytes: &[u8]) -> Result<Self::PublicKey>;

    /// Verify a signature.
    ///
    /// # Arguments
    ///
    /// * `pk` - The verification (public) key.
    /// * `message` - The message that was signed.
    /// * `signature` - The encoded signature.
    /// * `context` - Domain-separation context, at most [`MAX_CONTEXT_LEN`] bytes.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the signature is valid, `Ok(false)` if it is not, and
    /// `Err` only for malformed inputs or a failing backend.
    fn verify(
        &self,
        pk: &Self::PublicKey,
        message: &[u8],
        signature: &[u8],
        context: &[u8],
    ) -> Result<bool>;
}
