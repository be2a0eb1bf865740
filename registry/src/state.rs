//! # Registry Records & Keyed State
//!
//! The registry's canonical records — [`Configuration`], [`MintAuthority`],
//! [`ObjectManifest`] — and the keyed store they live in. Every record's
//! address is a deterministic function of fixed seed labels plus a
//! namespace, configuration address, or object identifier:
//!
//! ```text
//! configuration  = f(CONFIG_SEED,   namespace)
//! mint authority = f(AUTH_SEED,     configuration)
//! manifest       = f(MANIFEST_SEED, configuration, object_id)
//! object mint    = f(MINT_SEED,     manifest)
//! ```
//!
//! Callers recompute addresses from seeds before every call; the bump byte
//! each record stores at creation makes re-derivation a single hash rather
//! than a search.
//!
//! The store itself is a flat map per record type. The substrate's
//! single-writer-per-record guarantee is what makes this safe; the registry
//! adds no locking of its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use ember_protocol::address::{find_derived_address, Address};
use ember_protocol::config::{
    AUTH_SEED, CONFIG_SEED, MANIFEST_SEED, MAX_URI_LENGTH, MINT_SEED,
};
use ember_protocol::crypto::hash::domain_separated_hash;
use ember_protocol::deposit::BalanceSheet;
use ember_protocol::token::TokenLedger;

// ---------------------------------------------------------------------------
// Namespace
// ---------------------------------------------------------------------------

/// An opaque 32-byte identifier scoping one independent registry instance.
///
/// Namespaces are supplied externally and never created or destroyed here —
/// they are pure seed material. [`Namespace::from_label`] is a convenience
/// for operators who think in strings; the registry itself only ever sees
/// the 32 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace([u8; 32]);

impl Namespace {
    /// Wraps raw 32-byte namespace content.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derives a namespace from a human-readable label, via domain-separated
    /// BLAKE3. The same label always maps to the same namespace.
    pub fn from_label(label: &str) -> Self {
        Self(domain_separated_hash("ember/namespace/v1", label.as_bytes()))
    }

    /// The raw namespace bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Base58 rendering.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b58 = self.to_base58();
        write!(f, "Namespace({}..)", &b58[..8.min(b58.len())])
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

// ---------------------------------------------------------------------------
// Address derivation
// ---------------------------------------------------------------------------

/// Derives the configuration address for a namespace.
pub fn config_address(namespace: &Namespace) -> (Address, u8) {
    find_derived_address(&[CONFIG_SEED, namespace.as_bytes()])
        .expect("two seeds is always within the derivation limit")
}

/// Derives the keyless mint-authority address for a configuration.
pub fn authority_address(config: &Address) -> (Address, u8) {
    find_derived_address(&[AUTH_SEED, config.as_bytes()])
        .expect("two seeds is always within the derivation limit")
}

/// Derives the manifest address for an object id under a configuration.
pub fn manifest_address(config: &Address, object_id: u64) -> (Address, u8) {
    find_derived_address(&[MANIFEST_SEED, config.as_bytes(), &object_id.to_le_bytes()])
        .expect("three seeds is always within the derivation limit")
}

/// Derives the object-mint address for a manifest.
pub fn mint_address(manifest: &Address) -> (Address, u8) {
    find_derived_address(&[MINT_SEED, manifest.as_bytes()])
        .expect("two seeds is always within the derivation limit")
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Per-namespace governance record.
///
/// One per namespace; created once by `initialize`, mutated only by
/// governance instructions, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// The configuration's own (derived) address.
    pub address: Address,
    /// The governance authority. Every privileged instruction checks this.
    pub authority: Address,
    /// The namespace this configuration governs.
    pub namespace: Namespace,
    /// Bump byte for the configuration address.
    pub config_bump: u8,
    /// Bump byte for the mint-authority address.
    pub auth_bump: u8,
    /// Number of objects minted under this namespace.
    pub object_count: u64,
    /// When true, the mint pipeline rejects before touching any record.
    pub paused: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent governance mutation.
    pub updated_at: DateTime<Utc>,
}

impl Configuration {
    /// Serialized record footprint used for deposit sizing.
    pub const RECORD_LEN: usize = 32 + 32 + 32 + 1 + 1 + 8 + 1 + 8 + 8;
}

// ---------------------------------------------------------------------------
// MintAuthority
// ---------------------------------------------------------------------------

/// The registry's keyless signer for one configuration.
///
/// No keypair exists for this address (the derivation guarantees it), so
/// the only way to exercise its authority is through registry logic that
/// can reproduce its seeds. It co-signs metadata creation, collection
/// verification, token issuance, and authority rotation on the
/// configuration's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintAuthority {
    /// The authority's own (derived) address.
    pub address: Address,
    /// Back-reference to the owning configuration.
    pub config: Address,
    /// Bump byte for the authority address.
    pub bump: u8,
}

impl MintAuthority {
    /// Serialized record footprint used for deposit sizing.
    pub const RECORD_LEN: usize = 32 + 32 + 1;
}

// ---------------------------------------------------------------------------
// ObjectManifest
// ---------------------------------------------------------------------------

/// The registry's canonical record for one mintable object.
///
/// Identity fields (`config`, `object_id`, `mint`, `creator`, bumps) are
/// immutable after creation. Content fields (`manifest_hash`,
/// `metadata_uri`, `is_active`) change only through the ownership-gated
/// update path. `minted` flips false→true exactly once, and everything
/// expensive in the mint pipeline is keyed off that flip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectManifest {
    /// The manifest's own (derived) address.
    pub address: Address,
    /// The owning configuration.
    pub config: Address,
    /// Caller-chosen object identifier, unique per namespace.
    pub object_id: u64,
    /// The object's token mint, derived from this manifest's address.
    pub mint: Address,
    /// Bump byte for the manifest address.
    pub bump: u8,
    /// Bump byte for the mint address.
    pub mint_bump: u8,
    /// The payer that first created this manifest. Creator lists on the
    /// external metadata record must include this address.
    pub creator: Address,
    /// SHA-256 of the manifest content document.
    pub manifest_hash: [u8; 32],
    /// Content pointer, at most [`MAX_URI_LENGTH`] bytes.
    pub metadata_uri: String,
    /// Inactive objects reject further mint attempts.
    pub is_active: bool,
    /// Set exactly once, by the first successful mint.
    pub minted: bool,
    /// Whether identity fields have been written.
    pub initialized: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent content mutation.
    pub updated_at: DateTime<Utc>,
}

impl ObjectManifest {
    /// Serialized record footprint used for deposit sizing. The URI is
    /// budgeted at its cap so a manifest's deposit never depends on how
    /// long its current URI happens to be.
    pub const RECORD_LEN: usize =
        32 + 32 + 8 + 32 + 1 + 1 + 32 + 32 + (2 + MAX_URI_LENGTH) + 1 + 1 + 1 + 8 + 8;
}

// ---------------------------------------------------------------------------
// RegistryState
// ---------------------------------------------------------------------------

/// The registry's complete mutable state: records, the token ledger, and
/// the deposit balance sheet.
///
/// `Clone` is load-bearing: instruction execution snapshots the whole state
/// and restores it on error, which is what makes every instruction atomic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryState {
    pub(crate) configs: HashMap<Address, Configuration>,
    pub(crate) authorities: HashMap<Address, MintAuthority>,
    pub(crate) manifests: HashMap<Address, ObjectManifest>,
    pub(crate) tokens: TokenLedger,
    pub(crate) balances: BalanceSheet,
}

impl RegistryState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration at `address`, if any.
    pub fn config(&self, address: &Address) -> Option<&Configuration> {
        self.configs.get(address)
    }

    /// The configuration governing `namespace`, if initialized.
    pub fn config_by_namespace(&self, namespace: &Namespace) -> Option<&Configuration> {
        let (address, _) = config_address(namespace);
        self.configs.get(&address)
    }

    /// The mint authority at `address`, if any.
    pub fn mint_authority(&self, address: &Address) -> Option<&MintAuthority> {
        self.authorities.get(address)
    }

    /// The manifest at `address`, if any.
    pub fn manifest(&self, address: &Address) -> Option<&ObjectManifest> {
        self.manifests.get(address)
    }

    /// The manifest for `object_id` under `namespace`, if created.
    pub fn manifest_by_object_id(
        &self,
        namespace: &Namespace,
        object_id: u64,
    ) -> Option<&ObjectManifest> {
        let (config, _) = config_address(namespace);
        let (address, _) = manifest_address(&config, object_id);
        self.manifests.get(&address)
    }

    /// Read access to the token ledger.
    pub fn tokens(&self) -> &TokenLedger {
        &self.tokens
    }

    /// Read access to the balance sheet.
    pub fn balances(&self) -> &BalanceSheet {
        &self.balances
    }

    /// Number of configurations (live namespaces, including superseded
    /// ones left behind by migration).
    pub fn config_count(&self) -> usize {
        self.configs.len()
    }

    /// Number of manifests across all namespaces.
    pub fn manifest_count(&self) -> usize {
        self.manifests.len()
    }
}
