//! # Protocol Configuration & Constants
//!
//! Every magic number in EMBER lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! Seed labels and field limits are consensus-critical: changing any of them
//! changes every derived address and invalidates every existing record, so
//! treat this file as append-only once a network is live.

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Protocol fingerprint used in status reporting and handshakes.
pub const PROTOCOL_FINGERPRINT: &str = "EMBER-REGISTRY-2026";

/// The full version string, assembled at compile time so we don't allocate
/// for something this trivial at runtime.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Address Derivation
// ---------------------------------------------------------------------------

/// Domain-separation context for derived addresses. Mixed into every
/// candidate hash via BLAKE3 `derive_key`, so derived addresses can never
/// collide with hashes computed for any other purpose.
pub const ADDRESS_DERIVATION_CONTEXT: &str = "ember/derived-address/v1";

/// Seed label for namespace configuration records.
pub const CONFIG_SEED: &[u8] = b"config";

/// Seed label for the keyless mint authority signer.
pub const AUTH_SEED: &[u8] = b"auth";

/// Seed label for object manifest records.
pub const MANIFEST_SEED: &[u8] = b"object_manifest";

/// Seed label for object mints.
pub const MINT_SEED: &[u8] = b"object_mint";

/// Seed label for token holdings (owner + mint).
pub const HOLDING_SEED: &[u8] = b"token_holding";

/// Maximum number of seed parts a single derivation may carry. Generous —
/// the deepest derivation in the registry uses three parts plus the bump.
pub const MAX_DERIVATION_SEEDS: usize = 8;

// ---------------------------------------------------------------------------
// Field Limits
// ---------------------------------------------------------------------------

/// The manifest URI is stored directly on the manifest record. A smaller
/// allocation than the external protocol's cap keeps records compact while
/// still supporting typical HTTPS or IPFS style URIs.
pub const MAX_URI_LENGTH: usize = 128;

/// The external metadata protocol's own URI cap. Both caps are enforced
/// before any write — ours first, theirs second.
pub const METADATA_MAX_URI_LENGTH: usize = 200;

/// Maximum metadata name length in bytes.
pub const MAX_NAME_LENGTH: usize = 32;

/// Maximum metadata symbol length in bytes.
pub const MAX_SYMBOL_LENGTH: usize = 10;

/// Maximum number of creators on a metadata record.
pub const MAX_CREATOR_LIMIT: usize = 5;

/// Creator shares must sum to exactly this value.
pub const CREATOR_TOTAL_SHARE: u16 = 100;

/// Seller fee ceiling in basis points (100% = 10_000).
pub const MAX_SELLER_FEE_BASIS_POINTS: u16 = 10_000;

// ---------------------------------------------------------------------------
// Deposits
// ---------------------------------------------------------------------------

/// Flat component of the minimum deposit for any record, in motes (the
/// smallest accounting unit). Covers the fixed per-record overhead the
/// substrate charges regardless of payload size.
pub const DEPOSIT_BASE_MOTES: u64 = 890_880;

/// Per-byte component of the minimum deposit.
pub const DEPOSIT_PER_BYTE_MOTES: u64 = 6_960;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_labels_are_distinct() {
        // If two labels collide, two different record types can derive the
        // same address. That is a consensus catastrophe, not a style issue.
        let labels = [CONFIG_SEED, AUTH_SEED, MANIFEST_SEED, MINT_SEED, HOLDING_SEED];
        for (i, a) in labels.iter().enumerate() {
            for b in labels.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn uri_caps_are_ordered() {
        // The registry cap must be the tighter of the two, otherwise the
        // "ours first, theirs second" enforcement order is meaningless.
        assert!(MAX_URI_LENGTH <= METADATA_MAX_URI_LENGTH);
    }

    #[test]
    fn creator_limits_sane() {
        assert!(MAX_CREATOR_LIMIT >= 1);
        assert!(CREATOR_TOTAL_SHARE == 100);
        assert!(MAX_SELLER_FEE_BASIS_POINTS == 10_000);
    }

    #[test]
    fn deposit_parameters_positive() {
        assert!(DEPOSIT_BASE_MOTES > 0);
        assert!(DEPOSIT_PER_BYTE_MOTES > 0);
    }
}
