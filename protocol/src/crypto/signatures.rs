//! # Digital Signatures
//!
//! Ed25519 signing and verification — the backbone of authorization in
//! EMBER. Every instruction envelope, every creator co-signature, every
//! ownership proof is authenticated with an Ed25519 signature.
//!
//! ## Why not just use ed25519-dalek directly?
//!
//! We could, and in some internal code we do. But wrapping the operations
//! gives us:
//!
//! 1. A single place to audit all signing operations.
//! 2. Consistent error types across the codebase.
//! 3. A natural extension point for multi-sig later.
//! 4. Type safety — you can't accidentally pass a hash where a message goes.

use ed25519_dalek::{Signature as DalekSignature, Verifier, VerifyingKey};
use thiserror::Error;

use super::keys::{EmberKeypair, EmberPublicKey, EmberSignature};

/// Errors during signature operations.
///
/// Intentionally vague — we don't tell attackers why verification failed.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid signature bytes: expected 64 bytes")]
    InvalidSignatureBytes,

    #[error("invalid public key")]
    InvalidPublicKey,
}

/// Sign a message using an EMBER keypair.
///
/// Produces a 64-byte Ed25519 signature over the given message bytes.
/// The signature is deterministic (RFC 8032) — no nonce reuse bugs
/// possible.
///
/// # Example
///
/// ```
/// use ember_protocol::crypto::{EmberKeypair, sign, verify};
///
/// let keypair = EmberKeypair::generate();
/// let message = b"mint object 7 in namespace arcadia";
/// let signature = sign(&keypair, message);
///
/// assert!(verify(&keypair.public_key(), message, &signature));
/// ```
pub fn sign(keypair: &EmberKeypair, message: &[u8]) -> EmberSignature {
    keypair.sign(message)
}

/// Verify an Ed25519 signature against a public key and message.
///
/// Returns `true` if the signature is valid, `false` otherwise.
/// We intentionally don't distinguish between "invalid signature" and
/// "wrong public key" — both are just "nope." Giving attackers a
/// detailed error oracle is a bad idea.
pub fn verify(public_key: &EmberPublicKey, message: &[u8], signature: &EmberSignature) -> bool {
    public_key.verify(message, signature)
}

/// Verify a signature using raw byte components.
///
/// This is the "I got these bytes off the wire and need to check them"
/// variant. It parses the public key and signature bytes, then does the
/// verification. Used by the envelope layer where everything arrives as
/// byte slices rather than typed structs.
pub fn verify_raw(
    public_key_bytes: &[u8; 32],
    message: &[u8],
    signature_bytes: &[u8; 64],
) -> Result<(), SignatureError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key_bytes).map_err(|_| SignatureError::InvalidPublicKey)?;

    let signature = DalekSignature::from_bytes(signature_bytes);

    verifying_key
        .verify(message, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EmberKeypair;

    #[test]
    fn test_sign_and_verify() {
        let kp = EmberKeypair::generate();
        let msg = b"hello, world";
        let sig = sign(&kp, msg);
        assert!(verify(&kp.public_key(), msg, &sig));
    }

    #[test]
    fn test_wrong_message_fails() {
        let kp = EmberKeypair::generate();
        let sig = sign(&kp, b"correct message");
        assert!(!verify(&kp.public_key(), b"wrong message", &sig));
    }

    #[test]
    fn test_wrong_key_fails() {
        let kp1 = EmberKeypair::generate();
        let kp2 = EmberKeypair::generate();
        let msg = b"test message";
        let sig = sign(&kp1, msg);
        assert!(!verify(&kp2.public_key(), msg, &sig));
    }

    #[test]
    fn test_verify_raw_roundtrip() {
        let kp = EmberKeypair::generate();
        let msg = b"raw bytes off the wire";
        let sig = sign(&kp, msg);
        let sig_bytes: [u8; 64] = sig.as_bytes().try_into().unwrap();
        assert!(verify_raw(&kp.public_key_bytes(), msg, &sig_bytes).is_ok());
    }

    #[test]
    fn test_verify_raw_rejects_tampering() {
        let kp = EmberKeypair::generate();
        let sig = sign(&kp, b"original");
        let sig_bytes: [u8; 64] = sig.as_bytes().try_into().unwrap();
        assert!(verify_raw(&kp.public_key_bytes(), b"tampered", &sig_bytes).is_err());
    }
}
