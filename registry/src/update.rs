//! # Manifest Update — Ownership-Gated Mutation
//!
//! `update_object_manifest` lets the *current holder* of an object's token
//! rewrite the manifest's content fields — hash, URI, active flag — and
//! nothing else. Possession is the credential: the caller presents the
//! holding that carries the object's mint with balance ≥ 1, and the
//! registry checks it without taking custody of anything. Identity fields
//! never move through this path, and metadata creation is never
//! re-triggered.
//!
//! The new URI is also pushed into the external metadata record (signed by
//! the keyless mint authority) so the registry's view and the external
//! protocol's view cannot drift apart.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use ember_protocol::address::Address;
use ember_protocol::envelope::SignerSet;

use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::metadata::MetadataProtocol;
use crate::minting::check_uri;
use crate::registry::Registry;
use crate::state::{config_address, manifest_address, Namespace};

/// Arguments for [`Registry::update_object_manifest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateManifestArgs {
    /// The namespace the object lives in.
    pub namespace: Namespace,
    /// The object to update.
    pub object_id: u64,
    /// Replacement content hash.
    pub manifest_hash: [u8; 32],
    /// Replacement content URI.
    pub metadata_uri: String,
    /// Replacement active flag.
    pub is_active: bool,
    /// The holding the caller presents as proof of possession. Must be
    /// owned by the caller, denominated in the object's mint, and carry
    /// balance ≥ 1.
    pub holding: Address,
}

impl<M: MetadataProtocol> Registry<M> {
    /// Overwrites the manifest's mutable content fields, gated on proof
    /// that the caller holds the object's token.
    pub fn update_object_manifest(
        &mut self,
        args: UpdateManifestArgs,
        signers: &SignerSet,
    ) -> Result<(), RegistryError> {
        self.transactional(|reg| {
            // Both URI caps, before any state is read or written.
            check_uri(&args.metadata_uri)?;

            let owner = signers.payer();

            let (config_addr, _) = config_address(&args.namespace);
            if !reg.state.configs.contains_key(&config_addr) {
                return Err(RegistryError::ConfigNotFound {
                    namespace: args.namespace,
                });
            }
            let auth_addr = reg.mint_authority_for(&config_addr)?;

            let (manifest_addr, _) = manifest_address(&config_addr, args.object_id);
            let (mint_addr, object_id) = {
                let manifest = reg
                    .state
                    .manifests
                    .get(&manifest_addr)
                    .ok_or(RegistryError::ManifestNotInitialized)?;
                if !manifest.initialized {
                    return Err(RegistryError::ManifestNotInitialized);
                }
                if manifest.config != config_addr {
                    return Err(RegistryError::InvalidConfig);
                }
                (manifest.mint, manifest.object_id)
            };

            // --- ownership proof ----------------------------------------
            let holding = reg
                .state
                .tokens
                .holding(&args.holding)
                .ok_or(RegistryError::InvalidOwnerHolding)?;
            if holding.owner != owner {
                return Err(RegistryError::InvalidOwnerHolding);
            }
            if holding.mint != mint_addr {
                return Err(RegistryError::MintMismatch);
            }
            if holding.amount == 0 {
                return Err(RegistryError::NotObjectHolder);
            }

            // --- content overwrite --------------------------------------
            let manifest = reg
                .state
                .manifests
                .get_mut(&manifest_addr)
                .expect("checked above");
            manifest.manifest_hash = args.manifest_hash;
            manifest.metadata_uri = args.metadata_uri.clone();
            manifest.is_active = args.is_active;
            manifest.updated_at = Utc::now();

            // Keep the external record in lockstep.
            reg.metadata
                .update_uri(&mint_addr, &args.metadata_uri, &auth_addr)?;

            reg.events.emit(RegistryEvent::ManifestUpdated {
                config: config_addr,
                manifest: manifest_addr,
                mint: mint_addr,
                object_id,
                is_active: args.is_active,
            });

            tracing::info!(
                config = %config_addr,
                object_id,
                manifest = %manifest_addr,
                is_active = args.is_active,
                "manifest updated"
            );
            Ok(())
        })
    }
}
