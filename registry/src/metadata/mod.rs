//! # Metadata Adapter — the External Protocol Boundary
//!
//! The registry does not implement the NFT metadata protocol; it consumes
//! one through the [`MetadataProtocol`] call contract defined here. The
//! adapter layer owns three things:
//!
//! - the **vocabulary** the two systems share ([`types`]): creators,
//!   metadata records, master records, and the sized/unsized collection
//!   shape;
//! - the **call contract** itself and the versioned-dispatch helper for
//!   authority rotation ([`adapter`]);
//! - an **in-memory implementation** faithful enough for tests and the
//!   dev node ([`memory`]).
//!
//! Everything behind this boundary is externally owned. The registry
//! treats metadata failures as opaque: they surface as
//! [`MetadataError`] wrapped in `RegistryError::Metadata` and abort the
//! instruction like any other rejection.

pub mod adapter;
pub mod memory;
pub mod types;

pub use adapter::{rotate_update_authority, MetadataError, MetadataProtocol, RotationCall};
pub use memory::MemoryMetadata;
pub use types::{
    CollectionSizing, CreateMetadataArgs, CreatorShare, MasterRecord, MetadataRecord,
};
