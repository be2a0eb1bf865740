//! The call contract the registry holds the external metadata protocol to,
//! and the versioned-dispatch helper for authority rotation.
//!
//! Implementations own all metadata state. The registry proves its
//! authority over a call by passing the keyless mint-authority address it
//! derived from seeds; implementations compare that against the record's
//! stored update authority. There is no signature to check — a derived
//! address is keyless by construction, so possession of its seeds *is*
//! the credential.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use ember_protocol::address::Address;

use super::types::{CollectionSizing, CreateMetadataArgs, MetadataRecord};

/// Errors surfaced by the external metadata protocol.
///
/// The registry treats these as opaque: any of them aborts the calling
/// instruction. The variants exist so tests and operators can tell *which*
/// external expectation was violated, not so registry logic can branch on
/// them — with one deliberate exception: [`MetadataError::UnrecognizedCall`]
/// drives the versioned-dispatch fallback in [`rotate_update_authority`].
#[derive(Debug, Error)]
pub enum MetadataError {
    /// No metadata record exists for this mint.
    #[error("metadata record not found for mint {0}")]
    RecordNotFound(Address),

    /// A metadata record already exists for this mint.
    #[error("metadata record already exists for mint {0}")]
    RecordAlreadyExists(Address),

    /// No master record exists for this mint. Unsized collection
    /// verification requires the anchor's supply to be provably fixed.
    #[error("master record not found for mint {0}")]
    MasterRecordNotFound(Address),

    /// A master record already exists for this mint.
    #[error("master record already exists for mint {0}")]
    MasterRecordAlreadyExists(Address),

    /// The presented authority does not match the record's update authority.
    #[error("authority mismatch for mint {mint}")]
    AuthorityMismatch {
        /// The mint whose record rejected the caller.
        mint: Address,
    },

    /// The record is immutable.
    #[error("metadata record for mint {0} is immutable")]
    RecordImmutable(Address),

    /// A sized call was made against an unsized anchor, or vice versa.
    #[error("collection sizing mismatch: anchor is {actual}, call requires {required}")]
    SizingMismatch {
        /// The anchor's actual shape.
        actual: CollectionSizing,
        /// The shape the call requires.
        required: &'static str,
    },

    /// The item record does not claim membership in this anchor.
    #[error("record for mint {item} does not reference collection {anchor}")]
    CollectionMismatch {
        /// The item mint.
        item: Address,
        /// The anchor the caller named.
        anchor: Address,
    },

    /// The item's collection membership is already verified.
    #[error("collection membership for mint {0} is already verified")]
    AlreadyVerified(Address),

    /// A field exceeds the protocol's own limits.
    #[error("{field} exceeds the metadata protocol's limit of {max} bytes")]
    FieldTooLong {
        /// Which field was rejected.
        field: &'static str,
        /// The protocol's cap.
        max: usize,
    },

    /// The protocol version serving this endpoint does not recognize the
    /// call identifier.
    #[error("unrecognized call identifier: {0}")]
    UnrecognizedCall(RotationCall),
}

/// Call identifiers for the authority-rotation entry point.
///
/// The external protocol renamed this call across versions. Old
/// deployments recognize only [`RotationCall::Legacy`], current ones only
/// [`RotationCall::V2`] (or both, during migration windows). The registry
/// never knows which deployment it is talking to, hence the ordered
/// fallback in [`rotate_update_authority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationCall {
    /// The canonical, current identifier.
    V2,
    /// The pre-rename identifier still served by old deployments.
    Legacy,
}

impl fmt::Display for RotationCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationCall::V2 => write!(f, "update_authority_v2"),
            RotationCall::Legacy => write!(f, "update_authority_legacy"),
        }
    }
}

/// Candidate call identifiers for authority rotation, in dispatch order.
/// Canonical first, legacy fallback second. Versioned dispatch, not
/// exception-driven control flow: the list is data, the loop is the
/// policy.
pub const ROTATION_CALL_ORDER: [RotationCall; 2] = [RotationCall::V2, RotationCall::Legacy];

/// The call contract the registry consumes the external metadata protocol
/// through.
///
/// `Clone` is required because instruction atomicity snapshots the
/// collaborator alongside registry state: a metadata mutation from a
/// failed instruction must roll back with everything else.
pub trait MetadataProtocol: Clone {
    /// Creates the metadata record for a mint. First-mint step; the
    /// registry never calls this twice for the same mint.
    fn create_metadata(&mut self, args: CreateMetadataArgs) -> Result<(), MetadataError>;

    /// Creates the master record for a mint, permanently fixing its supply
    /// (zero prints). `authority` must be the record's update authority.
    fn create_master_record(
        &mut self,
        mint: &Address,
        authority: &Address,
    ) -> Result<(), MetadataError>;

    /// Verifies `item_mint`'s membership in an **unsized** anchor. The
    /// anchor must carry a master record (fixed supply); the call must be
    /// signed by the anchor's update authority.
    fn verify_collection_item(
        &mut self,
        item_mint: &Address,
        anchor_mint: &Address,
        authority: &Address,
    ) -> Result<(), MetadataError>;

    /// Verifies `item_mint`'s membership in a **sized** anchor,
    /// incrementing the anchor's tracked count by exactly one.
    fn verify_sized_collection_item(
        &mut self,
        item_mint: &Address,
        anchor_mint: &Address,
        authority: &Address,
    ) -> Result<(), MetadataError>;

    /// Rewrites a record's content URI. Used to keep the external record
    /// in lockstep with manifest updates.
    fn update_uri(
        &mut self,
        mint: &Address,
        uri: &str,
        authority: &Address,
    ) -> Result<(), MetadataError>;

    /// Rewrites a record's update authority via the named call identifier.
    /// Implementations serving a protocol version that does not recognize
    /// `call` must reject with [`MetadataError::UnrecognizedCall`] and
    /// leave state untouched.
    fn update_authority(
        &mut self,
        call: RotationCall,
        mint: &Address,
        new_authority: &Address,
        authority: &Address,
    ) -> Result<(), MetadataError>;

    /// Reads the record for a mint, if one exists.
    fn record(&self, mint: &Address) -> Option<&MetadataRecord>;

    /// Reads the anchor's sizing shape. This is the pure function the
    /// sized/unsized dispatch keys off.
    fn sizing_of(&self, anchor_mint: &Address) -> Result<CollectionSizing, MetadataError> {
        self.record(anchor_mint)
            .map(|r| r.sizing)
            .ok_or(MetadataError::RecordNotFound(*anchor_mint))
    }
}

/// Rotates an anchor's update authority, trying each call identifier in
/// [`ROTATION_CALL_ORDER`] until one is recognized.
///
/// Only [`MetadataError::UnrecognizedCall`] falls through to the next
/// candidate; any other rejection (wrong authority, missing record) is a
/// real failure and propagates immediately. Returns the identifier that
/// succeeded, mostly so logs can say which protocol generation answered.
pub fn rotate_update_authority<M: MetadataProtocol>(
    metadata: &mut M,
    anchor_mint: &Address,
    new_authority: &Address,
    authority: &Address,
) -> Result<RotationCall, MetadataError> {
    let mut last_unrecognized = None;
    for call in ROTATION_CALL_ORDER {
        match metadata.update_authority(call, anchor_mint, new_authority, authority) {
            Ok(()) => return Ok(call),
            Err(MetadataError::UnrecognizedCall(id)) => {
                last_unrecognized = Some(MetadataError::UnrecognizedCall(id));
            }
            Err(other) => return Err(other),
        }
    }
    Err(last_unrecognized.expect("ROTATION_CALL_ORDER is non-empty"))
}
