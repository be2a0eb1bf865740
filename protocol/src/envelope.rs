//! # Signed Instruction Envelope
//!
//! The only way signer authority enters the system. An envelope carries a
//! canonically-serialized (bincode) instruction payload plus any number of
//! Ed25519 signatures over those exact bytes. Verification yields a
//! [`SignerSet`] — the set of addresses whose signatures checked out — and
//! that set is the *only* thing registry-level authorization logic ever
//! consults. Registry code never sees raw signatures; it asks "did this
//! address sign?" and trusts the envelope layer to have answered honestly.
//!
//! The first signature is the envelope's designated payer, by convention:
//! whoever funds record deposits also fronts the transaction. Additional
//! signatures carry co-signing creators or governance authorities.
//!
//! Signatures cover the payload bytes verbatim. Re-serializing the payload
//! and signing the result is not the same thing — bincode is deterministic
//! for a fixed type and value, but sign-what-you-decoded is the rule that
//! keeps us honest if that ever changes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::address::Address;
use crate::crypto::keys::{EmberKeypair, EmberPublicKey, EmberSignature};

/// Errors that can occur while building or verifying an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The payload could not be serialized.
    #[error("payload encode error: {0}")]
    Encode(String),

    /// The payload bytes could not be deserialized into the requested type.
    #[error("payload decode error: {0}")]
    Decode(String),

    /// The envelope carries no signatures at all. An unsigned envelope has
    /// no payer and no authority; there is nothing the registry could do
    /// with it.
    #[error("envelope has no signatures")]
    NoSigners,

    /// A signature failed verification against the payload bytes.
    #[error("signature {index} does not verify against the payload")]
    SignatureInvalid {
        /// Position of the offending signature.
        index: usize,
    },
}

/// A serialized instruction plus the signatures that authorize it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedEnvelope {
    /// Bincode-serialized instruction payload.
    payload: Vec<u8>,
    /// (public key, signature) pairs over `payload`. Order matters: the
    /// first entry is the designated payer.
    signatures: Vec<(EmberPublicKey, EmberSignature)>,
}

impl SignedEnvelope {
    /// Serializes `payload` and wraps it in an unsigned envelope.
    pub fn new<T: Serialize>(payload: &T) -> Result<Self, EnvelopeError> {
        let bytes = bincode::serialize(payload).map_err(|e| EnvelopeError::Encode(e.to_string()))?;
        Ok(Self {
            payload: bytes,
            signatures: Vec::new(),
        })
    }

    /// Wraps pre-serialized payload bytes. Used when relaying an envelope
    /// whose bytes must not be re-encoded.
    pub fn from_payload_bytes(payload: Vec<u8>) -> Self {
        Self {
            payload,
            signatures: Vec::new(),
        }
    }

    /// Appends `keypair`'s signature over the payload bytes.
    ///
    /// The first signer becomes the designated payer.
    pub fn sign(&mut self, keypair: &EmberKeypair) {
        let signature = keypair.sign(&self.payload);
        self.signatures.push((keypair.public_key(), signature));
    }

    /// Attaches a pre-computed signature, for transports that carry
    /// payload and signatures separately. Verification happens in
    /// [`verify`](Self::verify), not here.
    pub fn attach_signature(&mut self, public_key: EmberPublicKey, signature: EmberSignature) {
        self.signatures.push((public_key, signature));
    }

    /// The raw payload bytes.
    pub fn payload_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Deserializes the payload into `T`.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, EnvelopeError> {
        bincode::deserialize(&self.payload).map_err(|e| EnvelopeError::Decode(e.to_string()))
    }

    /// Verifies every attached signature against the payload bytes and
    /// returns the resulting [`SignerSet`].
    ///
    /// All-or-nothing: one bad signature rejects the whole envelope. An
    /// envelope that is "mostly signed" is an envelope someone tampered
    /// with.
    pub fn verify(&self) -> Result<SignerSet, EnvelopeError> {
        let (first, _) = self
            .signatures
            .first()
            .ok_or(EnvelopeError::NoSigners)?;

        let payer = Address::from_public_key(first);

        let mut signers = HashSet::with_capacity(self.signatures.len());
        for (index, (public_key, signature)) in self.signatures.iter().enumerate() {
            if !public_key.verify(&self.payload, signature) {
                return Err(EnvelopeError::SignatureInvalid { index });
            }
            signers.insert(Address::from_public_key(public_key));
        }

        Ok(SignerSet { payer, signers })
    }
}

/// The verified fact of who signed an instruction.
///
/// Produced by [`SignedEnvelope::verify`]; constructible directly by test
/// harnesses and embedded callers that play the role of the verification
/// layer themselves.
#[derive(Debug, Clone)]
pub struct SignerSet {
    payer: Address,
    signers: HashSet<Address>,
}

impl SignerSet {
    /// Builds a signer set from a payer and additional co-signers. The
    /// payer is always a member of the set.
    pub fn new(payer: Address, co_signers: impl IntoIterator<Item = Address>) -> Self {
        let mut signers: HashSet<Address> = co_signers.into_iter().collect();
        signers.insert(payer);
        Self { payer, signers }
    }

    /// The designated payer (first signer).
    pub fn payer(&self) -> Address {
        self.payer
    }

    /// Whether `address` signed the instruction.
    pub fn is_signer(&self, address: &Address) -> bool {
        self.signers.contains(address)
    }

    /// Number of distinct signers.
    pub fn len(&self) -> usize {
        self.signers.len()
    }

    /// Whether the set is empty. It never is — construction requires a
    /// payer — but clippy insists `len` travels with `is_empty`.
    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}
