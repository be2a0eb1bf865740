//! # The Registry Facade
//!
//! [`Registry`] owns everything: the record stores, the deposit balance
//! sheet, the token ledger, the event log, and the external-metadata
//! collaborator. Instructions are methods; each one executes under
//! [`Registry::transactional`], which snapshots the whole world before the
//! body runs and restores it wholesale on any error. That single mechanism
//! is what delivers the atomicity contract: either every phase of an
//! instruction commits, or none of it ever happened — including account
//! creations and external-metadata mutations performed mid-pipeline.
//!
//! Concurrency exists only *outside* this type. `Registry` is a
//! single-writer structure; callers serialize through `&mut` (the node
//! wraps it in a lock). There are no internal locks to reason about and no
//! partial states to observe.

use ember_protocol::address::Address;

use crate::error::RegistryError;
use crate::events::EventLog;
use crate::metadata::MetadataProtocol;
use crate::state::RegistryState;

/// Runtime policy knobs for a registry deployment.
///
/// The deployer allow-list guards `initialize` against namespace squatting:
/// a caller may initialize a namespace only if they pay for it themselves
/// or appear on this list.
#[derive(Debug, Clone, Default)]
pub struct RegistryPolicy {
    /// Signers permitted to initialize namespaces they are not paying for.
    pub allowed_deployers: Vec<Address>,
}

impl RegistryPolicy {
    /// Whether `address` is on the deployer allow-list.
    pub fn allows_deployer(&self, address: &Address) -> bool {
        self.allowed_deployers.iter().any(|allowed| allowed == address)
    }
}

/// The governed object registry.
///
/// Generic over the external metadata protocol so tests, the dev node, and
/// a production dispatch layer can all sit behind the same state machine.
pub struct Registry<M: MetadataProtocol> {
    pub(crate) state: RegistryState,
    pub(crate) metadata: M,
    pub(crate) policy: RegistryPolicy,
    pub(crate) events: EventLog,
}

impl<M: MetadataProtocol> Registry<M> {
    /// Creates a registry with an empty state and default policy.
    pub fn new(metadata: M) -> Self {
        Self::with_policy(metadata, RegistryPolicy::default())
    }

    /// Creates a registry with an explicit policy.
    pub fn with_policy(metadata: M, policy: RegistryPolicy) -> Self {
        Self {
            state: RegistryState::new(),
            metadata,
            policy,
            events: EventLog::new(),
        }
    }

    /// Read access to registry state.
    pub fn state(&self) -> &RegistryState {
        &self.state
    }

    /// Read access to the metadata collaborator.
    pub fn metadata(&self) -> &M {
        &self.metadata
    }

    /// Mutable access to the metadata collaborator, for setup that is the
    /// anchor owner's job (registering collection anchors, funding test
    /// fixtures). Registry instructions never go through this.
    pub fn metadata_mut(&mut self) -> &mut M {
        &mut self.metadata
    }

    /// Read access to the event log.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The active policy.
    pub fn policy(&self) -> &RegistryPolicy {
        &self.policy
    }

    /// Credits a payer with spendable motes. Dev-network faucet surface;
    /// on a real deployment the substrate's ledger does this.
    pub fn credit_payer(&mut self, payer: Address, amount: u64) -> Result<(), RegistryError> {
        self.state.balances.credit(payer, amount)?;
        Ok(())
    }

    /// Executes `body` atomically: on error, registry state, metadata
    /// state, and the event log are restored to their pre-call values.
    ///
    /// Snapshot-by-clone is deliberate. The state is a handful of flat
    /// maps; cloning them is cheap relative to an instruction's crypto
    /// work, and wholesale restore is immune to the forgotten-undo bugs
    /// that plague journal-based rollback.
    pub(crate) fn transactional<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let state_snapshot = self.state.clone();
        let metadata_snapshot = self.metadata.clone();
        let events_mark = self.events.len();

        match body(self) {
            Ok(value) => Ok(value),
            Err(error) => {
                self.state = state_snapshot;
                self.metadata = metadata_snapshot;
                self.events.truncate(events_mark);
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RegistryEvent;
    use crate::metadata::MemoryMetadata;

    fn addr(tag: &[u8]) -> Address {
        ember_protocol::address::find_derived_address(&[b"registry-test", tag])
            .unwrap()
            .0
    }

    #[test]
    fn transactional_rolls_back_on_error() {
        let mut registry = Registry::new(MemoryMetadata::new());
        let payer = addr(b"payer");
        registry.credit_payer(payer, 1_000).unwrap();

        let result: Result<(), RegistryError> = registry.transactional(|reg| {
            reg.state.balances.credit(payer, 500)?;
            reg.events.emit(RegistryEvent::PauseChanged {
                config: addr(b"config"),
                paused: true,
            });
            Err(RegistryError::MintingPaused)
        });

        assert!(result.is_err());
        assert_eq!(registry.state.balances().balance_of(&payer), 1_000);
        assert!(registry.events().is_empty());
    }

    #[test]
    fn transactional_commits_on_success() {
        let mut registry = Registry::new(MemoryMetadata::new());
        let payer = addr(b"payer");

        registry
            .transactional(|reg| {
                reg.state.balances.credit(payer, 500)?;
                Ok(())
            })
            .unwrap();

        assert_eq!(registry.state.balances().balance_of(&payer), 500);
    }

    #[test]
    fn policy_allow_list_matches_exactly() {
        let deployer = addr(b"deployer");
        let policy = RegistryPolicy {
            allowed_deployers: vec![deployer],
        };
        assert!(policy.allows_deployer(&deployer));
        assert!(!policy.allows_deployer(&addr(b"someone-else")));
    }
}
