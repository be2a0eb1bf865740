//! # Instruction Envelope Payloads
//!
//! The serialized form of every registry operation, and the dispatcher
//! that runs a decoded instruction against the registry. This is what a
//! signed envelope's payload bytes decode into: clients bincode one of
//! these variants, sign the bytes, and submit.
//!
//! The dispatcher is a thin match — all semantics live in the instruction
//! implementations. Its one job is pairing each variant with its receipt.

use serde::{Deserialize, Serialize};

use ember_protocol::address::Address;
use ember_protocol::envelope::SignerSet;

use crate::error::RegistryError;
use crate::metadata::{MetadataProtocol, RotationCall};
use crate::minting::{MintObjectArgs, MintOutcome};
use crate::registry::Registry;
use crate::state::Namespace;
use crate::update::UpdateManifestArgs;

/// A registry instruction, as carried in a signed envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegistryInstruction {
    /// Create the Configuration + Mint Authority for a namespace.
    Initialize {
        namespace: Namespace,
        authority: Address,
    },
    /// Replace a configuration's governance authority.
    SetAuthority {
        namespace: Namespace,
        new_authority: Address,
    },
    /// Set a configuration's pause flag.
    SetPaused { namespace: Namespace, paused: bool },
    /// Copy a configuration to a new namespace.
    MigrateConfigNamespace {
        old_namespace: Namespace,
        new_namespace: Namespace,
    },
    /// Rewrite a collection anchor's update authority.
    RotateCollectionAuthority {
        namespace: Namespace,
        collection_mint: Address,
        new_update_authority: Address,
    },
    /// Run the mint pipeline.
    MintObjectNft(MintObjectArgs),
    /// Overwrite a manifest's mutable content fields.
    UpdateObjectManifest(UpdateManifestArgs),
}

/// What a committed instruction did, in a shape the API can serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum InstructionReceipt {
    /// A namespace was initialized.
    #[serde(rename = "initialized")]
    Initialized { config: Address },
    /// The governance authority was replaced.
    #[serde(rename = "authority_set")]
    AuthoritySet,
    /// The pause flag was set.
    #[serde(rename = "pause_set")]
    PauseSet { paused: bool },
    /// A configuration was copied to a new namespace.
    #[serde(rename = "migrated")]
    Migrated { new_config: Address },
    /// A collection anchor's authority was rotated.
    #[serde(rename = "authority_rotated")]
    AuthorityRotated { call: RotationCall },
    /// The mint pipeline committed.
    #[serde(rename = "minted")]
    Minted(MintOutcome),
    /// A manifest's content fields were overwritten.
    #[serde(rename = "manifest_updated")]
    ManifestUpdated,
}

impl<M: MetadataProtocol> Registry<M> {
    /// Executes a decoded instruction under the verified signer set.
    pub fn execute(
        &mut self,
        instruction: RegistryInstruction,
        signers: &SignerSet,
    ) -> Result<InstructionReceipt, RegistryError> {
        match instruction {
            RegistryInstruction::Initialize {
                namespace,
                authority,
            } => {
                let config = self.initialize(namespace, authority, signers)?;
                Ok(InstructionReceipt::Initialized { config })
            }
            RegistryInstruction::SetAuthority {
                namespace,
                new_authority,
            } => {
                self.set_authority(namespace, new_authority, signers)?;
                Ok(InstructionReceipt::AuthoritySet)
            }
            RegistryInstruction::SetPaused { namespace, paused } => {
                self.set_paused(namespace, paused, signers)?;
                Ok(InstructionReceipt::PauseSet { paused })
            }
            RegistryInstruction::MigrateConfigNamespace {
                old_namespace,
                new_namespace,
            } => {
                let new_config =
                    self.migrate_config_namespace(old_namespace, new_namespace, signers)?;
                Ok(InstructionReceipt::Migrated { new_config })
            }
            RegistryInstruction::RotateCollectionAuthority {
                namespace,
                collection_mint,
                new_update_authority,
            } => {
                let call = self.rotate_collection_authority(
                    namespace,
                    collection_mint,
                    new_update_authority,
                    signers,
                )?;
                Ok(InstructionReceipt::AuthorityRotated { call })
            }
            RegistryInstruction::MintObjectNft(args) => {
                let outcome = self.mint_object_nft(args, signers)?;
                Ok(InstructionReceipt::Minted(outcome))
            }
            RegistryInstruction::UpdateObjectManifest(args) => {
                self.update_object_manifest(args, signers)?;
                Ok(InstructionReceipt::ManifestUpdated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_roundtrip_through_bincode() {
        let instruction = RegistryInstruction::SetPaused {
            namespace: Namespace::from_label("arcadia"),
            paused: true,
        };
        let bytes = bincode::serialize(&instruction).unwrap();
        let decoded: RegistryInstruction = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, instruction);
    }
}
