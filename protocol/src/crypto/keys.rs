//! # Key Management
//!
//! Ed25519 keypair generation and serialization for EMBER signers.
//!
//! Every externally-owned signer in the registry — governance authorities,
//! payers, creators, NFT holders — is an Ed25519 keypair. Derived signers
//! (the keyless mint authority) deliberately have no keypair at all; see
//! [`crate::address`].
//!
//! ## Why Ed25519?
//!
//! - Deterministic signatures (no k-value footguns like ECDSA).
//! - 128-bit security level in 32+32 bytes. Compact and sufficient.
//! - Constant-time implementations exist and are well-audited.
//! - Fast verification — important when a mint carries up to five
//!   co-signing creators.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (thanks, ed25519-dalek).
//! - We use OS-level RNG (`OsRng`) for key generation. If your OS RNG
//!   is broken, you have bigger problems than EMBER.
//! - Key bytes are never logged. If you add logging to this module,
//!   you will be asked to leave.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during key operations.
///
/// These are intentionally vague about *why* something failed — leaking
/// details about key material through error messages is a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

/// An EMBER signer keypair wrapping Ed25519 signing and verification keys.
///
/// ## Serialization
///
/// `EmberKeypair` intentionally does NOT implement `Serialize`/`Deserialize`
/// directly. Serializing private keys should be a deliberate, conscious act,
/// not something that happens because someone shoved a keypair into a JSON
/// response. Use `to_bytes()` / `from_bytes()` explicitly.
///
/// # Examples
///
/// ```
/// use ember_protocol::crypto::keys::EmberKeypair;
///
/// let kp = EmberKeypair::generate();
/// let msg = b"mint object 7";
/// let sig = kp.sign(msg);
/// assert!(kp.verify(msg, &sig));
/// ```
pub struct EmberKeypair {
    /// The Ed25519 signing (private) key. 32 bytes of pure responsibility.
    signing_key: SigningKey,
}

/// The public half of an EMBER signer, safe to share with the world.
///
/// Its 32 bytes double as the signer's on-registry address — see
/// [`crate::address::Address::from_public_key`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmberPublicKey {
    bytes: [u8; 32],
}

/// An Ed25519 signature over a message.
///
/// 64 bytes. Deterministic for a given (key, message) pair. Stored as
/// `Vec<u8>` for serde compatibility, but always exactly 64 bytes — a
/// signature of any other length simply fails verification. No panics,
/// no undefined behavior, just a boolean `false`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmberSignature {
    bytes: Vec<u8>,
}

impl EmberKeypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Constructs a keypair deterministically from a 32-byte seed.
    ///
    /// The seed is used directly as the Ed25519 secret scalar. Useful for
    /// test fixtures and KDF-derived keys.
    ///
    /// **Warning**: if you call this with a weak seed, you get a weak key.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Reconstruct a keypair from raw 32-byte secret key material.
    ///
    /// Equivalent to [`from_seed`](Self::from_seed) — in Ed25519, the
    /// 32-byte secret key *is* the seed.
    pub fn from_bytes(secret_key_bytes: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self::from_seed(secret_key_bytes)
    }

    /// Reconstruct a keypair from a hex-encoded secret key.
    ///
    /// Convenience for loading dev keys from config. Please don't put raw
    /// hex keys in config files in production. But for devnet, we're not
    /// going to pretend you won't do it anyway.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSecretKey)?;
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(KeyError::InvalidSecretKey);
        }
        let mut arr = [0u8; SECRET_KEY_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(Self::from_bytes(&arr))
    }

    /// Returns the public key associated with this keypair.
    pub fn public_key(&self) -> EmberPublicKey {
        EmberPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Get the raw public key bytes (32 bytes).
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message and return an `EmberSignature`.
    ///
    /// Ed25519 signatures are deterministic — the same (key, message) pair
    /// always produces the same signature. No nonce games, no randomness
    /// needed at signing time.
    pub fn sign(&self, message: &[u8]) -> EmberSignature {
        let sig = self.signing_key.sign(message);
        EmberSignature {
            bytes: sig.to_bytes().to_vec(),
        }
    }

    /// Verify a signature against this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &EmberSignature) -> bool {
        self.public_key().verify(message, signature)
    }

    /// Exports the raw 32-byte secret key material.
    ///
    /// **Handle with extreme care.** Don't log it. Don't send it over the
    /// network in plaintext. Don't store it in a text file called
    /// "my_keys.txt" on your desktop.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }
}

impl Clone for EmberKeypair {
    /// Cloning a keypair is allowed but should make you uncomfortable.
    /// Every copy of a private key is another thing to protect.
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for EmberKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output. Not even
        // "partially." A partial leak is still a leak.
        write!(f, "EmberKeypair(pub={})", self.public_key().to_hex())
    }
}

impl PartialEq for EmberKeypair {
    /// Two keypairs are equal if their public keys match. Comparing secret
    /// material in a non-constant-time way is a bad habit, and for identity
    /// purposes the public key is what matters.
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes() == other.public_key_bytes()
    }
}

impl Eq for EmberKeypair {}

// ---------------------------------------------------------------------------
// EmberPublicKey
// ---------------------------------------------------------------------------

impl EmberPublicKey {
    /// Create an `EmberPublicKey` from raw bytes.
    ///
    /// No point validation happens here — use [`try_from_slice`](Self::try_from_slice)
    /// when the bytes come from an untrusted source.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Try to create an `EmberPublicKey` from a byte slice.
    ///
    /// Validates the length and that the bytes represent a valid Ed25519
    /// point. We don't just accept any 32 bytes — some values aren't valid
    /// points on the curve, and using them could lead to weird behavior.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        if slice.len() != 32 {
            return Err(KeyError::InvalidPublicKey);
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);

        // This catches low-order points and other degenerate cases.
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;

        Ok(Self { bytes })
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Verify a signature against this public key.
    ///
    /// Returns `true` if the signature is valid, `false` otherwise. A
    /// boolean (rather than `Result`) because the vast majority of callers
    /// just want a yes/no answer and don't care about the failure mode.
    pub fn verify(&self, message: &[u8], signature: &EmberSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig_bytes: [u8; 64] = match signature.bytes.as_slice().try_into() {
            Ok(b) => b,
            Err(_) => return false,
        };
        let dalek_sig = DalekSignature::from_bytes(&sig_bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }

    /// Hex-encoded public key, for logs and debugging.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for EmberPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmberPublicKey({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for EmberPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.bytes).into_string())
    }
}

// ---------------------------------------------------------------------------
// EmberSignature
// ---------------------------------------------------------------------------

impl EmberSignature {
    /// Create a signature from raw bytes. Length is checked at verification
    /// time, not here.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex-encoded signature.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Parse a hex-encoded signature.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self {
            bytes: hex::decode(s)?,
        })
    }
}

impl fmt::Debug for EmberSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmberSignature({}...)", &self.to_hex()[..12.min(self.bytes.len() * 2)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_sign_verify_roundtrip() {
        let kp = EmberKeypair::generate();
        let msg = b"update manifest for object 42";
        let sig = kp.sign(msg);
        assert!(kp.verify(msg, &sig));
    }

    #[test]
    fn wrong_message_fails_verification() {
        let kp = EmberKeypair::generate();
        let sig = kp.sign(b"original message");
        assert!(!kp.verify(b"tampered message", &sig));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let kp1 = EmberKeypair::generate();
        let kp2 = EmberKeypair::generate();
        let sig = kp1.sign(b"message");
        assert!(!kp2.verify(b"message", &sig));
    }

    #[test]
    fn from_seed_is_deterministic() {
        let seed = [7u8; 32];
        let kp1 = EmberKeypair::from_seed(&seed);
        let kp2 = EmberKeypair::from_seed(&seed);
        assert_eq!(kp1, kp2);
        assert_eq!(kp1.public_key_bytes(), kp2.public_key_bytes());
    }

    #[test]
    fn signatures_are_deterministic() {
        let kp = EmberKeypair::from_seed(&[9u8; 32]);
        let a = kp.sign(b"same message");
        let b = kp.sign(b"same message");
        assert_eq!(a, b);
    }

    #[test]
    fn hex_roundtrip() {
        let kp = EmberKeypair::generate();
        let hex = hex::encode(kp.to_bytes());
        let restored = EmberKeypair::from_hex(&hex).unwrap();
        assert_eq!(kp, restored);
    }

    #[test]
    fn malformed_signature_bytes_fail_closed() {
        let kp = EmberKeypair::generate();
        let truncated = EmberSignature::from_bytes(vec![0u8; 17]);
        assert!(!kp.verify(b"anything", &truncated));
    }

    #[test]
    fn try_from_slice_rejects_garbage() {
        assert!(EmberPublicKey::try_from_slice(&[0u8; 31]).is_err());
    }

    #[test]
    fn debug_output_never_contains_secret() {
        let kp = EmberKeypair::from_seed(&[3u8; 32]);
        let debug = format!("{:?}", kp);
        assert!(!debug.contains(&hex::encode(kp.to_bytes())));
    }
}
