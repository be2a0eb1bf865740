//! # Registry Error Taxonomy
//!
//! Every way an instruction can be rejected. Four families:
//!
//! - **authorization** — the signer set doesn't carry the required
//!   authority (wrong governance key, non-owner update, unsigned verified
//!   creator, unauthorized initializer);
//! - **state** — the records exist but are in the wrong shape for this
//!   instruction (paused namespace, inactive object, uninitialized
//!   manifest, identity mismatch);
//! - **validation** — the arguments themselves are malformed (oversized
//!   fields, bad share totals, fee out of range);
//! - **delegated** — failures surfaced opaquely from the protocol layer
//!   (token ledger, deposits, derivation) or the external metadata
//!   protocol.
//!
//! Every error aborts its instruction atomically. Nothing here retries;
//! retry policy belongs to clients.

use thiserror::Error;

use ember_protocol::address::Address;
use ember_protocol::deposit::DepositError;
use ember_protocol::token::TokenError;

use crate::metadata::MetadataError;
use crate::state::Namespace;

/// Errors that can occur during registry instruction execution.
#[derive(Debug, Error)]
pub enum RegistryError {
    // --- authorization ---
    /// The initializer is neither the payer nor on the deployer allow-list.
    #[error("the signer is not authorized to initialize this registry namespace")]
    UnauthorizedDeployer,

    /// The provided authority does not match the configuration authority,
    /// or did not sign.
    #[error("the provided authority does not match the configuration authority")]
    InvalidAuthority,

    /// A creator marked verified did not sign the instruction.
    #[error("verified metadata creator {creator} must sign the transaction")]
    CreatorMustSign {
        /// The creator whose signature is missing.
        creator: Address,
    },

    /// The caller does not hold the object's token.
    #[error("the caller must hold the object NFT to perform this action")]
    NotObjectHolder,

    /// The presented holding does not belong to the caller or is
    /// denominated in a different mint.
    #[error("the presented token holding does not match the caller and object mint")]
    InvalidOwnerHolding,

    // --- state ---
    /// The namespace has no configuration yet.
    #[error("no configuration exists for namespace {namespace}")]
    ConfigNotFound {
        /// The namespace that was looked up.
        namespace: Namespace,
    },

    /// A configuration already exists for this namespace.
    #[error("a configuration already exists for namespace {namespace}")]
    ConfigAlreadyExists {
        /// The already-configured namespace.
        namespace: Namespace,
    },

    /// Minting has been paused by the registry authority.
    #[error("minting is paused for this namespace")]
    MintingPaused,

    /// The requested object is currently inactive.
    #[error("object {object_id} is currently inactive")]
    ObjectInactive {
        /// The inactive object.
        object_id: u64,
    },

    /// The object manifest has not been initialized yet.
    #[error("the object manifest has not been initialized yet")]
    ManifestNotInitialized,

    /// The manifest is associated with a different configuration.
    #[error("the manifest belongs to a different configuration")]
    InvalidConfig,

    /// The supplied object identifier does not match the stored manifest.
    /// Derivation makes this unreachable unless the store is corrupted;
    /// the check exists to fail loudly if it ever is.
    #[error("object id {got} does not match the stored manifest's id {expected}")]
    ObjectIdMismatch {
        /// The id recorded on the manifest.
        expected: u64,
        /// The id the caller supplied.
        got: u64,
    },

    /// The mint provided does not match the stored mint for this object.
    #[error("the mint does not match the stored mint for this object")]
    MintMismatch,

    /// The supplied manifest content does not match the stored record.
    /// Re-mint attempts must present identical content.
    #[error("the supplied manifest content does not match the stored record")]
    ManifestMismatch,

    // --- validation ---
    /// A URI exceeds the registry's or the external protocol's cap.
    #[error("metadata URI is {len} bytes; the permitted maximum is {max}")]
    UriTooLong {
        /// The rejected length.
        len: usize,
        /// The violated cap.
        max: usize,
    },

    /// Metadata name exceeds the allowed length.
    #[error("metadata name is {len} bytes; the permitted maximum is {max}")]
    NameTooLong {
        /// The rejected length.
        len: usize,
        /// The violated cap.
        max: usize,
    },

    /// Metadata symbol exceeds the allowed length.
    #[error("metadata symbol is {len} bytes; the permitted maximum is {max}")]
    SymbolTooLong {
        /// The rejected length.
        len: usize,
        /// The violated cap.
        max: usize,
    },

    /// Creator shares are empty or do not sum to exactly the required total.
    #[error("creator shares sum to {total}; they must sum to exactly 100")]
    InvalidCreatorShares {
        /// The rejected total.
        total: u16,
    },

    /// Too many creators supplied.
    #[error("{count} creators supplied; the permitted maximum is {max}")]
    TooManyCreators {
        /// Number of creators supplied.
        count: usize,
        /// The allowed maximum.
        max: usize,
    },

    /// Seller fee basis points exceed the permitted maximum.
    #[error("seller fee of {basis_points} bps exceeds the permitted maximum of 10000")]
    InvalidSellerFee {
        /// The rejected fee.
        basis_points: u16,
    },

    /// The creator list does not include the manifest's recorded creator.
    #[error("metadata creators must include the recorded object creator")]
    MissingManifestCreator,

    // --- delegated ---
    /// Token ledger failure.
    #[error("token ledger error: {0}")]
    Token(#[from] TokenError),

    /// Deposit / balance failure.
    #[error("deposit error: {0}")]
    Deposit(#[from] DepositError),

    /// Failure surfaced from the external metadata protocol.
    #[error("metadata protocol error: {0}")]
    Metadata(#[from] MetadataError),
}
