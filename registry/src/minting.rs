//! # The Mint Pipeline
//!
//! `mint_object_nft` — the registry's core state machine. Nine phases, in
//! a fixed order, inside one atomic transaction:
//!
//! 1. pause check (fails fast, nothing touched)
//! 2. manifest ensure (create-or-revalidate, deposit top-up)
//! 3. mint ensure (create-or-revalidate)
//! 4. recipient holding ensure (create-or-revalidate)
//! 5. metadata creation          — first mint only
//! 6. token issuance             — skipped as a safe no-op on retries
//! 7. master record + supply seal — first mint only
//! 8. collection verification     — first mint only, sized/unsized dispatch
//! 9. bookkeeping: `minted` flip, object count, event
//!
//! The `minted` flag is the compare-and-set gate that makes retries cheap:
//! a duplicate call re-validates every account (phases 2–4), skips every
//! expensive phase, and commits nothing but an event. Under concurrent
//! attempts for the same object, the substrate's single-writer guarantee
//! means at most one caller observes `minted == false`.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use ember_protocol::address::Address;
use ember_protocol::config::{
    CREATOR_TOTAL_SHARE, MAX_CREATOR_LIMIT, MAX_NAME_LENGTH, MAX_SELLER_FEE_BASIS_POINTS,
    MAX_SYMBOL_LENGTH, MAX_URI_LENGTH, METADATA_MAX_URI_LENGTH,
};
use ember_protocol::deposit::minimum_deposit;
use ember_protocol::envelope::SignerSet;
use ember_protocol::token::{Holding, MintRecord};

use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::metadata::{
    CollectionSizing, CreateMetadataArgs, CreatorShare, MetadataProtocol,
};
use crate::registry::Registry;
use crate::state::{config_address, manifest_address, mint_address, Namespace, ObjectManifest};

/// Arguments for [`Registry::mint_object_nft`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintObjectArgs {
    /// The namespace to mint under.
    pub namespace: Namespace,
    /// Caller-chosen object identifier, unique per namespace.
    pub object_id: u64,
    /// Content pointer for the manifest. On a retry this must match the
    /// stored URI (or be empty, which means "whatever is stored").
    pub manifest_uri: String,
    /// SHA-256 of the manifest content document.
    pub manifest_hash: [u8; 32],
    /// Display name for the external metadata record.
    pub metadata_name: String,
    /// Symbol for the external metadata record.
    pub metadata_symbol: String,
    /// Royalty fee in basis points, at most 10000.
    pub seller_fee_basis_points: u16,
    /// Creator entries; shares must sum to exactly 100 and include the
    /// manifest's recorded creator.
    pub creators: Vec<CreatorShare>,
    /// Who receives the minted unit.
    pub recipient: Address,
    /// The collection anchor the object joins.
    pub collection_mint: Address,
}

/// Which collection-verification call a first mint went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationPath {
    /// The anchor tracks a count; the sized call incremented it.
    Sized,
    /// The anchor relies on its fixed-supply parent; the unsized call ran.
    Unsized,
}

/// What a successful mint call did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintOutcome {
    /// The governing configuration.
    pub config: Address,
    /// The object's manifest record.
    pub manifest: Address,
    /// The object's mint.
    pub mint: Address,
    /// The holder of the minted unit.
    pub recipient: Address,
    /// The object identifier.
    pub object_id: u64,
    /// True when this call ran the first-mint steps; false for a retried
    /// duplicate that only re-validated.
    pub first_mint: bool,
    /// The verification path taken, `None` on retries.
    pub verification: Option<VerificationPath>,
}

impl<M: MetadataProtocol> Registry<M> {
    /// Mints (or re-validates) the object identified by
    /// `args.object_id` under `args.namespace`. See the module docs for
    /// the phase breakdown.
    pub fn mint_object_nft(
        &mut self,
        args: MintObjectArgs,
        signers: &SignerSet,
    ) -> Result<MintOutcome, RegistryError> {
        self.transactional(|reg| {
            let payer = signers.payer();

            // --- Phase 1: pause check -----------------------------------
            let (config_addr, _) = config_address(&args.namespace);
            {
                let config = reg.state.configs.get(&config_addr).ok_or(
                    RegistryError::ConfigNotFound {
                        namespace: args.namespace,
                    },
                )?;
                if config.paused {
                    return Err(RegistryError::MintingPaused);
                }
            }
            let auth_addr = reg.mint_authority_for(&config_addr)?;

            // --- Phase 2: manifest ensure -------------------------------
            let (manifest_addr, manifest_bump) = manifest_address(&config_addr, args.object_id);
            let (mint_addr, mint_bump) = mint_address(&manifest_addr);

            let was_minted;
            let manifest_creator;
            let stored_uri;
            match reg.state.manifests.get(&manifest_addr) {
                None => {
                    check_uri(&args.manifest_uri)?;

                    reg.state.balances.fund_deposit(
                        &payer,
                        manifest_addr,
                        minimum_deposit(ObjectManifest::RECORD_LEN),
                    )?;

                    let now = Utc::now();
                    reg.state.manifests.insert(
                        manifest_addr,
                        ObjectManifest {
                            address: manifest_addr,
                            config: config_addr,
                            object_id: args.object_id,
                            mint: mint_addr,
                            bump: manifest_bump,
                            mint_bump,
                            creator: payer,
                            manifest_hash: args.manifest_hash,
                            metadata_uri: args.manifest_uri.clone(),
                            is_active: true,
                            minted: false,
                            initialized: true,
                            created_at: now,
                            updated_at: now,
                        },
                    );

                    was_minted = false;
                    manifest_creator = payer;
                    stored_uri = args.manifest_uri.clone();
                }
                Some(manifest) => {
                    if !manifest.is_active {
                        return Err(RegistryError::ObjectInactive {
                            object_id: args.object_id,
                        });
                    }
                    if manifest.object_id != args.object_id {
                        return Err(RegistryError::ObjectIdMismatch {
                            expected: manifest.object_id,
                            got: args.object_id,
                        });
                    }
                    if manifest.config != config_addr {
                        return Err(RegistryError::InvalidConfig);
                    }
                    if manifest.mint != mint_addr {
                        return Err(RegistryError::MintMismatch);
                    }
                    if manifest.manifest_hash != args.manifest_hash {
                        return Err(RegistryError::ManifestMismatch);
                    }
                    // A retry may omit the URI; a non-empty one must match
                    // what the manifest already stores.
                    if !args.manifest_uri.is_empty() {
                        check_uri(&args.manifest_uri)?;
                        if manifest.metadata_uri != args.manifest_uri {
                            return Err(RegistryError::ManifestMismatch);
                        }
                    }

                    was_minted = manifest.minted;
                    manifest_creator = manifest.creator;
                    stored_uri = manifest.metadata_uri.clone();

                    // Top the deposit back up if the pricing parameters
                    // have moved since creation.
                    reg.state.balances.top_up(
                        &payer,
                        manifest_addr,
                        minimum_deposit(ObjectManifest::RECORD_LEN),
                    )?;
                }
            }

            // --- Phase 3: mint ensure -----------------------------------
            match reg.state.tokens.mint(&mint_addr) {
                None => {
                    reg.state.balances.fund_deposit(
                        &payer,
                        mint_addr,
                        minimum_deposit(MintRecord::RECORD_LEN),
                    )?;
                    reg.state
                        .tokens
                        .create_mint(mint_addr, auth_addr, Some(auth_addr), 0)?;
                }
                Some(existing) => {
                    if existing.mint_authority != auth_addr {
                        return Err(RegistryError::MintMismatch);
                    }
                }
            }

            // --- Phase 4: recipient holding ensure ----------------------
            let holding_addr = reg.state.tokens.ensure_holding(args.recipient, mint_addr)?;
            reg.state.balances.top_up(
                &payer,
                holding_addr,
                minimum_deposit(Holding::RECORD_LEN),
            )?;

            let is_first_mint = !was_minted;

            // --- Phase 5: metadata creation (first mint only) -----------
            if is_first_mint {
                if args.metadata_name.len() > MAX_NAME_LENGTH {
                    return Err(RegistryError::NameTooLong {
                        len: args.metadata_name.len(),
                        max: MAX_NAME_LENGTH,
                    });
                }
                if args.metadata_symbol.len() > MAX_SYMBOL_LENGTH {
                    return Err(RegistryError::SymbolTooLong {
                        len: args.metadata_symbol.len(),
                        max: MAX_SYMBOL_LENGTH,
                    });
                }
                if args.creators.is_empty() {
                    return Err(RegistryError::InvalidCreatorShares { total: 0 });
                }
                if args.creators.len() > MAX_CREATOR_LIMIT {
                    return Err(RegistryError::TooManyCreators {
                        count: args.creators.len(),
                        max: MAX_CREATOR_LIMIT,
                    });
                }
                if args.seller_fee_basis_points > MAX_SELLER_FEE_BASIS_POINTS {
                    return Err(RegistryError::InvalidSellerFee {
                        basis_points: args.seller_fee_basis_points,
                    });
                }

                let total: u16 = args.creators.iter().map(|c| c.share as u16).sum();
                if total != CREATOR_TOTAL_SHARE {
                    return Err(RegistryError::InvalidCreatorShares { total });
                }
                if !args.creators.iter().any(|c| c.address == manifest_creator) {
                    return Err(RegistryError::MissingManifestCreator);
                }

                let mut metadata_creators = Vec::with_capacity(args.creators.len());
                for creator in &args.creators {
                    if creator.verified && !signers.is_signer(&creator.address) {
                        return Err(RegistryError::CreatorMustSign {
                            creator: creator.address,
                        });
                    }
                    metadata_creators.push(CreatorShare {
                        address: creator.address,
                        verified: creator.verified && signers.is_signer(&creator.address),
                        share: creator.share,
                    });
                }

                reg.metadata.create_metadata(CreateMetadataArgs {
                    mint: mint_addr,
                    update_authority: auth_addr,
                    name: args.metadata_name.clone(),
                    symbol: args.metadata_symbol.clone(),
                    // Always the manifest's stored URI — never raw client
                    // input, which a retry is allowed to omit.
                    uri: stored_uri.clone(),
                    seller_fee_basis_points: args.seller_fee_basis_points,
                    creators: metadata_creators,
                    collection: args.collection_mint,
                })?;
            }

            // --- Phase 6: token issuance --------------------------------
            if is_first_mint {
                reg.state
                    .tokens
                    .mint_to(&mint_addr, &args.recipient, 1, &auth_addr)?;
            }
            // On a retried duplicate the supply is already sealed at one;
            // issuing again is skipped as a safe no-op. Phase 4 already
            // re-validated the recipient's holding linkage.

            // --- Phase 7: master record + supply seal (first mint only) -
            if is_first_mint {
                reg.metadata.create_master_record(&mint_addr, &auth_addr)?;
                reg.state.tokens.seal_supply(&mint_addr, &auth_addr)?;
            }

            // --- Phase 8: collection verification (first mint only) -----
            let verification = if is_first_mint {
                // Dispatch is a pure function of the anchor's shape as
                // read right now — client input has no vote.
                match reg.metadata.sizing_of(&args.collection_mint)? {
                    CollectionSizing::Sized(_) => {
                        reg.metadata.verify_sized_collection_item(
                            &mint_addr,
                            &args.collection_mint,
                            &auth_addr,
                        )?;
                        Some(VerificationPath::Sized)
                    }
                    CollectionSizing::Unsized => {
                        reg.metadata.verify_collection_item(
                            &mint_addr,
                            &args.collection_mint,
                            &auth_addr,
                        )?;
                        Some(VerificationPath::Unsized)
                    }
                }
            } else {
                None
            };

            // --- Phase 9: bookkeeping -----------------------------------
            if is_first_mint {
                let manifest = reg
                    .state
                    .manifests
                    .get_mut(&manifest_addr)
                    .expect("ensured in phase 2");
                manifest.minted = true;
                manifest.updated_at = Utc::now();

                let config = reg
                    .state
                    .configs
                    .get_mut(&config_addr)
                    .expect("checked in phase 1");
                config.object_count = config.object_count.saturating_add(1);
            }

            reg.events.emit(RegistryEvent::ObjectMinted {
                config: config_addr,
                manifest: manifest_addr,
                mint: mint_addr,
                recipient: args.recipient,
                object_id: args.object_id,
            });

            tracing::info!(
                config = %config_addr,
                object_id = args.object_id,
                mint = %mint_addr,
                recipient = %args.recipient,
                first_mint = is_first_mint,
                "object mint committed"
            );

            Ok(MintOutcome {
                config: config_addr,
                manifest: manifest_addr,
                mint: mint_addr,
                recipient: args.recipient,
                object_id: args.object_id,
                first_mint: is_first_mint,
                verification,
            })
        })
    }
}

/// Enforces both URI caps — the registry's own, then the external
/// protocol's — before anything is written.
pub(crate) fn check_uri(uri: &str) -> Result<(), RegistryError> {
    if uri.len() > MAX_URI_LENGTH {
        return Err(RegistryError::UriTooLong {
            len: uri.len(),
            max: MAX_URI_LENGTH,
        });
    }
    if uri.len() > METADATA_MAX_URI_LENGTH {
        return Err(RegistryError::UriTooLong {
            len: uri.len(),
            max: METADATA_MAX_URI_LENGTH,
        });
    }
    Ok(())
}
