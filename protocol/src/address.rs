//! # Addresses & Deterministic Derivation
//!
//! Every record in the registry lives at a 32-byte address, displayed in
//! base58. Addresses come in exactly two flavors:
//!
//! - **Signer addresses** — the raw bytes of an Ed25519 public key. Whoever
//!   holds the matching secret key can sign for the address.
//! - **Derived addresses** — computed from fixed seed labels plus record
//!   identifiers via domain-separated BLAKE3. Derived addresses are
//!   *keyless by construction*: any candidate that decodes to a valid
//!   Ed25519 curve point is rejected, and a bump byte walks candidates
//!   until an off-curve one is found. No keypair can ever sign for a
//!   derived address, so authority over one can only be exercised by the
//!   registry logic that knows its seeds.
//!
//! ```text
//! candidate(bump) = BLAKE3_derive_key("ember/derived-address/v1",
//!                                     len(seed_0) || seed_0 || ... || bump)
//! derived address = first candidate, walking bump 255 -> 0, that is
//!                   NOT a valid Ed25519 point
//! ```
//!
//! Seeds are length-prefixed before hashing so adjacent seeds can't bleed
//! into each other — `["ab", "c"]` and `["a", "bc"]` derive different
//! addresses.
//!
//! Callers must recompute derived addresses from seeds before every call
//! and never cache them across namespace changes; the derivation is cheap
//! and the cache invalidation bugs are not.

use curve25519_dalek::edwards::CompressedEdwardsY;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{ADDRESS_DERIVATION_CONTEXT, MAX_DERIVATION_SEEDS};
use crate::crypto::hash::domain_separated_hash_multi;
use crate::crypto::keys::EmberPublicKey;

/// Errors that can occur during address operations.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The base58 string could not be decoded.
    #[error("base58 decode error: {0}")]
    Base58Decode(String),

    /// The decoded data has an unexpected length.
    #[error("invalid address length: expected 32 bytes, got {got}")]
    InvalidLength {
        /// Actual number of bytes.
        got: usize,
    },

    /// Too many seed parts were supplied for one derivation.
    #[error("too many derivation seeds: {got} (maximum {max})")]
    TooManySeeds {
        /// Number of seeds supplied.
        got: usize,
        /// The allowed maximum.
        max: usize,
    },

    /// No bump in 0..=255 produced an off-curve candidate.
    ///
    /// Statistically this requires ~2^-256 luck (each candidate is
    /// off-curve with probability ~1/2), but the error path exists because
    /// "can't happen" and `unwrap()` have ruined better codebases.
    #[error("no valid bump found for the given seeds")]
    NoValidBump,

    /// The supplied bump does not produce an off-curve address for these
    /// seeds — either the bump is stale or the seeds are wrong.
    #[error("bump {bump} does not derive a keyless address for these seeds")]
    InvalidBump {
        /// The rejected bump byte.
        bump: u8,
    },
}

/// A 32-byte registry address.
///
/// Equality, ordering, and hashing are byte-wise; display is base58.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address([u8; 32]);

impl Address {
    /// Creates an address from raw 32-byte content.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The address of an externally-owned signer is its public key, verbatim.
    pub fn from_public_key(key: &EmberPublicKey) -> Self {
        Self(*key.as_bytes())
    }

    /// Returns the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the raw bytes by value.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Base58 rendering, the canonical external form.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Parses a base58-encoded address.
    pub fn from_base58(s: &str) -> Result<Self, AddressError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| AddressError::Base58Decode(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(AddressError::InvalidLength { got: bytes.len() });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Whether these bytes decode to a valid Ed25519 curve point — i.e.
    /// whether a keypair *could* exist for this address. Derived addresses
    /// are guaranteed to return `false`.
    pub fn is_on_curve(&self) -> bool {
        CompressedEdwardsY(self.0).decompress().is_some()
    }
}

impl fmt::Debug for Address {
    // Truncated base58 keeps log lines readable; the full form is one
    // `Display` away.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b58 = self.to_base58();
        write!(f, "Address({}..)", &b58[..8.min(b58.len())])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Computes the candidate address for a seed tuple and bump byte.
fn candidate(seeds: &[&[u8]], bump: u8) -> [u8; 32] {
    let bump_seed = [bump];
    let mut parts: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
    parts.extend_from_slice(seeds);
    parts.push(&bump_seed);
    domain_separated_hash_multi(ADDRESS_DERIVATION_CONTEXT, &parts)
}

/// Finds the derived (keyless) address for a seed tuple.
///
/// Walks the bump byte downward from 255 and returns the first candidate
/// that is not a valid Ed25519 point, together with the bump that produced
/// it. The bump is stored on the derived record so later calls can
/// re-derive with [`derive_address`] instead of searching again.
///
/// # Errors
///
/// [`AddressError::TooManySeeds`] if the tuple exceeds
/// [`MAX_DERIVATION_SEEDS`]; [`AddressError::NoValidBump`] in the
/// astronomically unlikely case that all 256 candidates are on-curve.
pub fn find_derived_address(seeds: &[&[u8]]) -> Result<(Address, u8), AddressError> {
    if seeds.len() > MAX_DERIVATION_SEEDS {
        return Err(AddressError::TooManySeeds {
            got: seeds.len(),
            max: MAX_DERIVATION_SEEDS,
        });
    }

    for bump in (0..=255u8).rev() {
        let bytes = candidate(seeds, bump);
        let addr = Address::from_bytes(bytes);
        if !addr.is_on_curve() {
            return Ok((addr, bump));
        }
    }

    Err(AddressError::NoValidBump)
}

/// Re-derives the address for a seed tuple and a known bump.
///
/// This is the verification counterpart to [`find_derived_address`]: given
/// the bump a record stored at creation time, it recomputes the address and
/// rejects any (seeds, bump) pair that lands on-curve. Callers compare the
/// result against the record address they were handed — a mismatch means
/// the caller's seeds are stale or forged.
pub fn derive_address(seeds: &[&[u8]], bump: u8) -> Result<Address, AddressError> {
    if seeds.len() > MAX_DERIVATION_SEEDS {
        return Err(AddressError::TooManySeeds {
            got: seeds.len(),
            max: MAX_DERIVATION_SEEDS,
        });
    }

    let addr = Address::from_bytes(candidate(seeds, bump));
    if addr.is_on_curve() {
        return Err(AddressError::InvalidBump { bump });
    }
    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::EmberKeypair;

    #[test]
    fn derivation_is_deterministic() {
        let (a1, b1) = find_derived_address(&[b"config", b"namespace-1"]).unwrap();
        let (a2, b2) = find_derived_address(&[b"config", b"namespace-1"]).unwrap();
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
    }

    #[test]
    fn different_seeds_different_addresses() {
        let (a, _) = find_derived_address(&[b"config", b"namespace-1"]).unwrap();
        let (b, _) = find_derived_address(&[b"config", b"namespace-2"]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn seed_boundaries_matter() {
        // Length prefixing means shifting a byte across a seed boundary
        // must change the derived address.
        let (a, _) = find_derived_address(&[b"ab", b"c"]).unwrap();
        let (b, _) = find_derived_address(&[b"a", b"bc"]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn derived_addresses_are_off_curve() {
        for i in 0u8..16 {
            let (addr, _) = find_derived_address(&[b"probe", &[i]]).unwrap();
            assert!(!addr.is_on_curve(), "derived address must be keyless");
        }
    }

    #[test]
    fn derive_with_stored_bump_matches_search() {
        let seeds: &[&[u8]] = &[b"object_manifest", b"some-config", &7u64.to_le_bytes()];
        let (found, bump) = find_derived_address(seeds).unwrap();
        let rederived = derive_address(seeds, bump).unwrap();
        assert_eq!(found, rederived);
    }

    #[test]
    fn wrong_bump_is_rejected_or_differs() {
        let seeds: &[&[u8]] = &[b"config", b"bump-test"];
        let (addr, bump) = find_derived_address(seeds).unwrap();
        // A different bump either fails the off-curve check or derives a
        // different address; it must never silently alias the real one.
        let other_bump = bump.wrapping_sub(1);
        match derive_address(seeds, other_bump) {
            Ok(other) => assert_ne!(other, addr),
            Err(AddressError::InvalidBump { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn public_keys_are_on_curve() {
        // Signer addresses must decompress — this is the other half of the
        // keyless guarantee.
        let kp = EmberKeypair::generate();
        let addr = Address::from_public_key(&kp.public_key());
        assert!(addr.is_on_curve());
    }

    #[test]
    fn too_many_seeds_rejected() {
        let seed: &[u8] = b"x";
        let seeds = vec![seed; MAX_DERIVATION_SEEDS + 1];
        assert!(matches!(
            find_derived_address(&seeds),
            Err(AddressError::TooManySeeds { .. })
        ));
    }

    #[test]
    fn base58_roundtrip() {
        let (addr, _) = find_derived_address(&[b"roundtrip"]).unwrap();
        let encoded = addr.to_base58();
        let decoded = Address::from_base58(&encoded).unwrap();
        assert_eq!(addr, decoded);
    }

    #[test]
    fn malformed_base58_rejected() {
        assert!(Address::from_base58("not base58 0OIl").is_err());
        assert!(matches!(
            Address::from_base58("abc"),
            Err(AddressError::InvalidLength { .. }) | Err(AddressError::Base58Decode(_))
        ));
    }
}
