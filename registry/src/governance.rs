//! # Governance Surface
//!
//! Namespace lifecycle and authority management: `initialize`,
//! `set_authority`, `set_paused`, `migrate_config_namespace`, and
//! `rotate_collection_authority`. Every operation here is gated on the
//! configuration's governance authority having signed, except
//! `initialize`, which is gated on the payer-or-allow-listed rule that
//! keeps namespace squatters out.
//!
//! Migration deliberately leaves the old configuration live. Closing it
//! would make migration irreversible and strand in-flight instructions
//! derived against the old namespace; the cost is a dual-authority window
//! the operator is expected to close by pausing the old namespace.

use chrono::Utc;

use ember_protocol::deposit::minimum_deposit;
use ember_protocol::envelope::SignerSet;

use ember_protocol::address::Address;

use crate::error::RegistryError;
use crate::events::RegistryEvent;
use crate::metadata::{rotate_update_authority, MetadataProtocol, RotationCall};
use crate::registry::Registry;
use crate::state::{
    authority_address, config_address, Configuration, MintAuthority, Namespace,
};

impl<M: MetadataProtocol> Registry<M> {
    /// Creates the Configuration and Mint Authority records for a
    /// namespace.
    ///
    /// `authority` becomes the governance authority. The caller must be
    /// the fee-payer or appear on the deployer allow-list; anyone else is
    /// rejected before any record is touched. Returns the new
    /// configuration's address.
    pub fn initialize(
        &mut self,
        namespace: Namespace,
        authority: Address,
        signers: &SignerSet,
    ) -> Result<Address, RegistryError> {
        self.transactional(|reg| {
            let payer = signers.payer();
            if !signers.is_signer(&authority) {
                return Err(RegistryError::UnauthorizedDeployer);
            }
            if authority != payer && !reg.policy.allows_deployer(&authority) {
                return Err(RegistryError::UnauthorizedDeployer);
            }

            let (config_addr, config_bump) = config_address(&namespace);
            if reg.state.configs.contains_key(&config_addr) {
                return Err(RegistryError::ConfigAlreadyExists { namespace });
            }
            let (auth_addr, auth_bump) = authority_address(&config_addr);

            reg.state.balances.fund_deposit(
                &payer,
                config_addr,
                minimum_deposit(Configuration::RECORD_LEN),
            )?;
            reg.state.balances.fund_deposit(
                &payer,
                auth_addr,
                minimum_deposit(MintAuthority::RECORD_LEN),
            )?;

            let now = Utc::now();
            reg.state.configs.insert(
                config_addr,
                Configuration {
                    address: config_addr,
                    authority,
                    namespace,
                    config_bump,
                    auth_bump,
                    object_count: 0,
                    paused: false,
                    created_at: now,
                    updated_at: now,
                },
            );
            reg.state.authorities.insert(
                auth_addr,
                MintAuthority {
                    address: auth_addr,
                    config: config_addr,
                    bump: auth_bump,
                },
            );

            tracing::info!(
                namespace = %namespace,
                config = %config_addr,
                authority = %authority,
                "namespace initialized"
            );
            Ok(config_addr)
        })
    }

    /// Replaces the configuration's governance authority.
    ///
    /// Requires the current authority's signature. Takes effect
    /// immediately — there is no two-step handshake, so double-check the
    /// new address before signing.
    pub fn set_authority(
        &mut self,
        namespace: Namespace,
        new_authority: Address,
        signers: &SignerSet,
    ) -> Result<(), RegistryError> {
        self.transactional(|reg| {
            let config_addr = reg.authorized_config(&namespace, signers)?;
            let config = reg.state.configs.get_mut(&config_addr).expect("checked");
            config.authority = new_authority;
            config.updated_at = Utc::now();

            tracing::info!(config = %config_addr, new_authority = %new_authority, "authority rotated");
            Ok(())
        })
    }

    /// Sets the namespace's pause flag.
    ///
    /// Level-triggered: the pause-changed event is emitted even when the
    /// flag already had the requested value. Consumers alert off "the
    /// authority touched the switch", not off the transition.
    pub fn set_paused(
        &mut self,
        namespace: Namespace,
        paused: bool,
        signers: &SignerSet,
    ) -> Result<(), RegistryError> {
        self.transactional(|reg| {
            let config_addr = reg.authorized_config(&namespace, signers)?;
            let config = reg.state.configs.get_mut(&config_addr).expect("checked");
            config.paused = paused;
            config.updated_at = Utc::now();

            reg.events.emit(RegistryEvent::PauseChanged {
                config: config_addr,
                paused,
            });
            tracing::info!(config = %config_addr, paused, "pause flag set");
            Ok(())
        })
    }

    /// Creates a fresh Configuration + Mint Authority under
    /// `new_namespace`, copying the authority, object count, and pause
    /// flag from the old configuration.
    ///
    /// The old configuration is left intact — an explicit rollback-safety
    /// choice. Callers should re-derive every address against the new
    /// namespace and point subsequent instructions at the new records.
    /// Returns the new configuration's address.
    pub fn migrate_config_namespace(
        &mut self,
        old_namespace: Namespace,
        new_namespace: Namespace,
        signers: &SignerSet,
    ) -> Result<Address, RegistryError> {
        self.transactional(|reg| {
            let old_config_addr = reg.authorized_config(&old_namespace, signers)?;
            let old_config = reg.state.configs.get(&old_config_addr).expect("checked").clone();

            let (new_config_addr, config_bump) = config_address(&new_namespace);
            if reg.state.configs.contains_key(&new_config_addr) {
                return Err(RegistryError::ConfigAlreadyExists {
                    namespace: new_namespace,
                });
            }
            let (new_auth_addr, auth_bump) = authority_address(&new_config_addr);

            let payer = signers.payer();
            reg.state.balances.fund_deposit(
                &payer,
                new_config_addr,
                minimum_deposit(Configuration::RECORD_LEN),
            )?;
            reg.state.balances.fund_deposit(
                &payer,
                new_auth_addr,
                minimum_deposit(MintAuthority::RECORD_LEN),
            )?;

            let now = Utc::now();
            reg.state.configs.insert(
                new_config_addr,
                Configuration {
                    address: new_config_addr,
                    authority: old_config.authority,
                    namespace: new_namespace,
                    config_bump,
                    auth_bump,
                    object_count: old_config.object_count,
                    paused: old_config.paused,
                    created_at: now,
                    updated_at: now,
                },
            );
            reg.state.authorities.insert(
                new_auth_addr,
                MintAuthority {
                    address: new_auth_addr,
                    config: new_config_addr,
                    bump: auth_bump,
                },
            );

            tracing::info!(
                old_config = %old_config_addr,
                new_config = %new_config_addr,
                new_namespace = %new_namespace,
                "namespace migrated"
            );
            Ok(new_config_addr)
        })
    }

    /// Rewrites a collection anchor's update authority through the
    /// metadata adapter, signed by the configuration's keyless mint
    /// authority.
    ///
    /// Tries the canonical call identifier first and falls back to the
    /// legacy identifier if the serving deployment rejects it as
    /// unrecognized. Returns the identifier that succeeded.
    pub fn rotate_collection_authority(
        &mut self,
        namespace: Namespace,
        collection_mint: Address,
        new_update_authority: Address,
        signers: &SignerSet,
    ) -> Result<RotationCall, RegistryError> {
        self.transactional(|reg| {
            let config_addr = reg.authorized_config(&namespace, signers)?;
            let auth_addr = reg.mint_authority_for(&config_addr)?;

            let used = rotate_update_authority(
                &mut reg.metadata,
                &collection_mint,
                &new_update_authority,
                &auth_addr,
            )?;

            tracing::info!(
                config = %config_addr,
                collection = %collection_mint,
                call = %used,
                "collection authority rotated"
            );
            Ok(used)
        })
    }

    /// Looks up the configuration for `namespace` and checks that its
    /// governance authority signed. Returns the configuration address.
    pub(crate) fn authorized_config(
        &self,
        namespace: &Namespace,
        signers: &SignerSet,
    ) -> Result<Address, RegistryError> {
        let (config_addr, _) = config_address(namespace);
        let config = self
            .state
            .configs
            .get(&config_addr)
            .ok_or(RegistryError::ConfigNotFound {
                namespace: *namespace,
            })?;
        if !signers.is_signer(&config.authority) {
            return Err(RegistryError::InvalidAuthority);
        }
        Ok(config_addr)
    }

    /// Resolves the keyless mint-authority address for a configuration,
    /// re-deriving from the stored bump as a self-check.
    pub(crate) fn mint_authority_for(&self, config: &Address) -> Result<Address, RegistryError> {
        let (auth_addr, _) = authority_address(config);
        let record = self
            .state
            .authorities
            .get(&auth_addr)
            .ok_or(RegistryError::InvalidConfig)?;
        if record.config != *config {
            return Err(RegistryError::InvalidConfig);
        }
        Ok(auth_addr)
    }
}
