//! # EMBER Object Registry
//!
//! The governed registry at the heart of EMBER: it mints, verifies, and
//! updates ownership-bearing collectible objects scoped to independent
//! namespaces, delegating token-standard mechanics to an external NFT
//! metadata protocol it does not control (consumed only through the
//! [`metadata::MetadataProtocol`] call contract).
//!
//! The interesting engineering is the account-lifecycle state machine:
//!
//! - every record address is a deterministic function of a namespace,
//!   a configuration address, or an object identifier;
//! - first-mint bookkeeping is idempotent — retried mints never re-run
//!   metadata creation, supply sealing, or collection verification;
//! - collection verification branches between two mutually exclusive
//!   external calls based purely on the anchor's externally-owned sizing
//!   shape;
//! - manifest mutation is gated on proof of possession of the object's
//!   token, not on any registry-side escrow.
//!
//! ## Design Principles
//!
//! 1. All monetary and counter arithmetic checks for overflow — wrapping
//!    arithmetic and money do not mix.
//! 2. State transitions are explicit: enum variants, not boolean flags,
//!    wherever a record can be in more than two states.
//! 3. Signature-derived authority gates every privileged operation.
//! 4. Every instruction is atomic: it commits wholesale or leaves no trace.
//! 5. Every public type is serializable (serde) for wire transport and
//!    persistent storage.

pub mod error;
pub mod events;
pub mod governance;
pub mod instruction;
pub mod metadata;
pub mod minting;
pub mod registry;
pub mod state;
pub mod update;

pub use error::RegistryError;
pub use events::{EventLog, EventRecord, RegistryEvent};
pub use instruction::{InstructionReceipt, RegistryInstruction};
pub use minting::{MintObjectArgs, MintOutcome, VerificationPath};
pub use registry::{Registry, RegistryPolicy};
pub use state::{Configuration, MintAuthority, Namespace, ObjectManifest};
pub use update::UpdateManifestArgs;
