//! Shared vocabulary between the registry and the external metadata
//! protocol.
//!
//! These types are intentionally kept small and `Copy`-friendly where
//! possible — they cross the adapter boundary on every first mint.

use serde::{Deserialize, Serialize};
use std::fmt;

use ember_protocol::address::Address;

// ---------------------------------------------------------------------------
// CreatorShare
// ---------------------------------------------------------------------------

/// One creator's entry on a metadata record: who they are, whether their
/// participation is signature-verified, and their royalty share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorShare {
    /// The creator's signer address.
    pub address: Address,
    /// True once the creator has co-signed a mint naming them. The
    /// registry refuses to set this without an actual signature.
    pub verified: bool,
    /// Royalty share in percent. All shares on a record sum to exactly 100.
    pub share: u8,
}

// ---------------------------------------------------------------------------
// CollectionSizing
// ---------------------------------------------------------------------------

/// The collection anchor's sizing shape — the single input that decides
/// which verification call applies.
///
/// Exactly one of two mutually exclusive external states:
///
/// - `Sized(count)` — the anchor tracks how many verified items it
///   contains; verification must go through the sized call, which
///   increments the count.
/// - `Unsized` — the anchor declares no count and relies on its parent
///   master record's fixed-supply-of-one invariant; verification must go
///   through the unsized call.
///
/// The shape is owned and mutated entirely outside this system. Clients
/// have no say in the dispatch: it is a pure function of this value as
/// read from the anchor at verification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionSizing {
    /// The anchor tracks a verified-item count.
    Sized(u64),
    /// The anchor relies on its fixed-supply-of-one parent record.
    Unsized,
}

impl fmt::Display for CollectionSizing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionSizing::Sized(count) => write!(f, "Sized({count})"),
            CollectionSizing::Unsized => write!(f, "Unsized"),
        }
    }
}

// ---------------------------------------------------------------------------
// CollectionRef
// ---------------------------------------------------------------------------

/// A metadata record's pointer to the collection anchor it claims
/// membership in. `verified` flips true only through one of the two
/// verification calls, signed by the anchor's authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    /// The anchor's mint address.
    pub key: Address,
    /// Whether membership has been verified by the anchor's authority.
    pub verified: bool,
}

// ---------------------------------------------------------------------------
// MetadataRecord
// ---------------------------------------------------------------------------

/// An externally-owned metadata record, as the adapter sees it.
///
/// For object records, the registry creates these on first mint. For
/// collection anchors, the record pre-exists and the registry only ever
/// reads it (sizing) or rewrites its update authority (rotation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// The mint this record describes.
    pub mint: Address,
    /// The signer allowed to mutate this record.
    pub update_authority: Address,
    /// Display name, at most 32 bytes.
    pub name: String,
    /// Ticker-style symbol, at most 10 bytes.
    pub symbol: String,
    /// Content URI, at most 200 bytes (the external protocol's own cap).
    pub uri: String,
    /// Royalty fee in basis points.
    pub seller_fee_basis_points: u16,
    /// Creator entries; shares sum to exactly 100.
    pub creators: Vec<CreatorShare>,
    /// Collection membership claim, if any.
    pub collection: Option<CollectionRef>,
    /// Whether the record accepts further mutation.
    pub is_mutable: bool,
    /// Sizing shape — `Sized` only on collection anchor records.
    pub sizing: CollectionSizing,
}

// ---------------------------------------------------------------------------
// MasterRecord
// ---------------------------------------------------------------------------

/// The supply-fixing companion record for a mint.
///
/// Creating a master record permanently caps reproduction: `max_prints`
/// of zero (the only value the registry ever writes) is the
/// fixed-supply-of-one invariant unsized collection verification leans on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterRecord {
    /// The mint whose supply this record fixes.
    pub mint: Address,
    /// Permitted print (copy) count. Zero means none, ever.
    pub max_prints: u64,
}

// ---------------------------------------------------------------------------
// CreateMetadataArgs
// ---------------------------------------------------------------------------

/// Arguments for first-mint metadata creation, assembled by the registry
/// and dispatched through the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMetadataArgs {
    /// The object mint the record will describe.
    pub mint: Address,
    /// The keyless mint authority, which becomes the record's update
    /// authority.
    pub update_authority: Address,
    /// Display name.
    pub name: String,
    /// Symbol.
    pub symbol: String,
    /// Content URI (the manifest's stored URI, never client input).
    pub uri: String,
    /// Royalty fee in basis points.
    pub seller_fee_basis_points: u16,
    /// Creator entries, already share- and signature-validated by the
    /// registry.
    pub creators: Vec<CreatorShare>,
    /// The collection anchor the record claims membership in. Written
    /// unverified; verification is a separate, authority-signed call.
    pub collection: Address,
}
