//! Integration tests for the governance surface: namespace initialization
//! and the deployer allow-list, authority transfer, the level-triggered
//! pause switch, namespace migration, and collection-authority rotation
//! with its versioned-dispatch fallback.

use ember_protocol::address::Address;
use ember_protocol::crypto::keys::EmberKeypair;
use ember_protocol::envelope::SignerSet;

use ember_registry::metadata::{
    CollectionSizing, CreatorShare, MemoryMetadata, MetadataProtocol, RotationCall,
};
use ember_registry::state::authority_address;
use ember_registry::{
    MintObjectArgs, Namespace, Registry, RegistryError, RegistryEvent, RegistryPolicy,
};

const FUNDING: u64 = 1_000_000_000;

fn signer(seed: u8) -> (EmberKeypair, Address) {
    let kp = EmberKeypair::from_seed(&[seed; 32]);
    let addr = Address::from_public_key(&kp.public_key());
    (kp, addr)
}

fn funded_registry(payers: &[Address]) -> Registry<MemoryMetadata> {
    let mut registry = Registry::new(MemoryMetadata::new());
    for payer in payers {
        registry.credit_payer(*payer, FUNDING).unwrap();
    }
    registry
}

fn mint_args(namespace: Namespace, object_id: u64, creator: Address, anchor: Address) -> MintObjectArgs {
    MintObjectArgs {
        namespace,
        object_id,
        manifest_uri: format!("ipfs://manifests/{object_id}"),
        manifest_hash: [0x11; 32],
        metadata_name: format!("Relic #{object_id}"),
        metadata_symbol: "RLC".into(),
        seller_fee_basis_points: 0,
        creators: vec![CreatorShare {
            address: creator,
            verified: true,
            share: 100,
        }],
        recipient: creator,
        collection_mint: anchor,
    }
}

// ---------------------------------------------------------------------------
// Initialization & the allow-list
// ---------------------------------------------------------------------------

#[test]
fn self_paying_authority_may_initialize() {
    let (_, payer) = signer(1);
    let mut registry = funded_registry(&[payer]);
    let namespace = Namespace::from_label("arcadia");

    let config = registry
        .initialize(namespace, payer, &SignerSet::new(payer, []))
        .unwrap();

    let stored = registry.state().config_by_namespace(&namespace).unwrap();
    assert_eq!(stored.address, config);
    assert_eq!(stored.authority, payer);
    assert_eq!(stored.object_count, 0);
    assert!(!stored.paused);
    // The keyless co-signer exists and points back at the config.
    let (auth, _) = authority_address(&config);
    assert_eq!(registry.state().mint_authority(&auth).unwrap().config, config);
}

#[test]
fn foreign_authority_requires_allow_list() {
    let (_, payer) = signer(1);
    let (_, foreign) = signer(2);
    let namespace = Namespace::from_label("arcadia");

    // Not allow-listed: rejected, nothing persisted, nothing paid.
    let mut registry = funded_registry(&[payer]);
    let err = registry
        .initialize(namespace, foreign, &SignerSet::new(payer, [foreign]))
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnauthorizedDeployer));
    assert!(registry.state().config_by_namespace(&namespace).is_none());
    assert_eq!(registry.state().balances().balance_of(&payer), FUNDING);

    // Allow-listed: accepted.
    let mut registry = Registry::with_policy(
        MemoryMetadata::new(),
        RegistryPolicy {
            allowed_deployers: vec![foreign],
        },
    );
    registry.credit_payer(payer, FUNDING).unwrap();
    registry
        .initialize(namespace, foreign, &SignerSet::new(payer, [foreign]))
        .unwrap();
    assert_eq!(
        registry.state().config_by_namespace(&namespace).unwrap().authority,
        foreign
    );
}

#[test]
fn authority_must_actually_sign() {
    let (_, payer) = signer(1);
    let (_, absent) = signer(2);
    let mut registry = Registry::with_policy(
        MemoryMetadata::new(),
        RegistryPolicy {
            allowed_deployers: vec![absent],
        },
    );
    registry.credit_payer(payer, FUNDING).unwrap();

    // Allow-listed but not a signer: still rejected.
    let err = registry
        .initialize(
            Namespace::from_label("arcadia"),
            absent,
            &SignerSet::new(payer, []),
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnauthorizedDeployer));
}

#[test]
fn double_initialize_rejected() {
    let (_, payer) = signer(1);
    let mut registry = funded_registry(&[payer]);
    let namespace = Namespace::from_label("arcadia");
    let signers = SignerSet::new(payer, []);

    registry.initialize(namespace, payer, &signers).unwrap();
    let err = registry.initialize(namespace, payer, &signers).unwrap_err();
    assert!(matches!(err, RegistryError::ConfigAlreadyExists { .. }));
}

#[test]
fn underfunded_initialize_leaves_no_trace() {
    let (_, payer) = signer(1);
    let mut registry = Registry::new(MemoryMetadata::new());
    registry.credit_payer(payer, 5).unwrap();
    let namespace = Namespace::from_label("arcadia");

    let err = registry
        .initialize(namespace, payer, &SignerSet::new(payer, []))
        .unwrap_err();
    assert!(matches!(err, RegistryError::Deposit(_)));
    assert!(registry.state().config_by_namespace(&namespace).is_none());
    assert_eq!(registry.state().balances().balance_of(&payer), 5);
}

// ---------------------------------------------------------------------------
// Authority transfer
// ---------------------------------------------------------------------------

#[test]
fn set_authority_replaces_and_revokes() {
    let (_, payer) = signer(1);
    let (_, successor) = signer(2);
    let mut registry = funded_registry(&[payer]);
    let namespace = Namespace::from_label("arcadia");
    let old_signers = SignerSet::new(payer, []);

    registry.initialize(namespace, payer, &old_signers).unwrap();
    registry
        .set_authority(namespace, successor, &old_signers)
        .unwrap();
    assert_eq!(
        registry.state().config_by_namespace(&namespace).unwrap().authority,
        successor
    );

    // The old authority is out, immediately.
    let err = registry
        .set_paused(namespace, true, &old_signers)
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidAuthority));

    // The successor is in.
    registry
        .set_paused(namespace, true, &SignerSet::new(successor, []))
        .unwrap();
}

#[test]
fn governance_on_unknown_namespace_rejected() {
    let (_, payer) = signer(1);
    let mut registry = funded_registry(&[payer]);
    let err = registry
        .set_paused(
            Namespace::from_label("never-initialized"),
            true,
            &SignerSet::new(payer, []),
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::ConfigNotFound { .. }));
}

// ---------------------------------------------------------------------------
// Pause switch
// ---------------------------------------------------------------------------

#[test]
fn pause_events_are_level_triggered() {
    let (_, payer) = signer(1);
    let mut registry = funded_registry(&[payer]);
    let namespace = Namespace::from_label("arcadia");
    let signers = SignerSet::new(payer, []);
    registry.initialize(namespace, payer, &signers).unwrap();

    // Setting the flag to the value it already has still emits.
    registry.set_paused(namespace, false, &signers).unwrap();
    registry.set_paused(namespace, false, &signers).unwrap();
    registry.set_paused(namespace, true, &signers).unwrap();

    let pause_events: Vec<bool> = registry
        .events()
        .iter()
        .filter_map(|r| match r.event {
            RegistryEvent::PauseChanged { paused, .. } => Some(paused),
            _ => None,
        })
        .collect();
    assert_eq!(pause_events, vec![false, false, true]);
}

// ---------------------------------------------------------------------------
// Namespace migration
// ---------------------------------------------------------------------------

#[test]
fn migration_copies_state_and_leaves_old_config_live() {
    let (_, payer) = signer(1);
    let mut registry = funded_registry(&[payer]);
    let old_ns = Namespace::from_label("arcadia");
    let new_ns = Namespace::from_label("arcadia-v2");
    let signers = SignerSet::new(payer, []);

    let old_config = registry.initialize(old_ns, payer, &signers).unwrap();

    // Put some history on the old namespace first.
    let anchor = Address::from_bytes([0xA7; 32]);
    let (auth, _) = authority_address(&old_config);
    registry
        .metadata_mut()
        .register_collection_anchor(anchor, auth, CollectionSizing::Unsized);
    registry
        .mint_object_nft(mint_args(old_ns, 1, payer, anchor), &signers)
        .unwrap();
    registry.set_paused(old_ns, true, &signers).unwrap();

    let new_config = registry
        .migrate_config_namespace(old_ns, new_ns, &signers)
        .unwrap();
    assert_ne!(old_config, new_config);

    let old = registry.state().config_by_namespace(&old_ns).unwrap();
    let new = registry.state().config_by_namespace(&new_ns).unwrap();

    // Authority, object count, and pause flag are copied.
    assert_eq!(new.authority, old.authority);
    assert_eq!(new.object_count, 1);
    assert!(new.paused);

    // The old configuration is intact — both are simultaneously live,
    // which is exactly the documented dual-authority hazard.
    assert_eq!(old.object_count, 1);
    assert_eq!(registry.state().config_count(), 2);

    // Both namespaces accept governance from the same authority.
    registry.set_paused(old_ns, false, &signers).unwrap();
    registry.set_paused(new_ns, false, &signers).unwrap();

    // Minting under the new namespace derives fresh addresses: the same
    // object id maps to a different manifest than under the old one.
    let (new_auth, _) = authority_address(&new_config);
    let anchor2 = Address::from_bytes([0xB8; 32]);
    registry
        .metadata_mut()
        .register_collection_anchor(anchor2, new_auth, CollectionSizing::Unsized);
    let outcome = registry
        .mint_object_nft(mint_args(new_ns, 1, payer, anchor2), &signers)
        .unwrap();
    assert!(outcome.first_mint);
    let old_manifest = registry.state().manifest_by_object_id(&old_ns, 1).unwrap();
    assert_ne!(old_manifest.address, outcome.manifest);
}

#[test]
fn migration_to_existing_namespace_rejected() {
    let (_, payer) = signer(1);
    let mut registry = funded_registry(&[payer]);
    let ns_a = Namespace::from_label("arcadia");
    let ns_b = Namespace::from_label("elysium");
    let signers = SignerSet::new(payer, []);

    registry.initialize(ns_a, payer, &signers).unwrap();
    registry.initialize(ns_b, payer, &signers).unwrap();

    let err = registry
        .migrate_config_namespace(ns_a, ns_b, &signers)
        .unwrap_err();
    assert!(matches!(err, RegistryError::ConfigAlreadyExists { .. }));
}

#[test]
fn migration_requires_current_authority() {
    let (_, payer) = signer(1);
    let (_, stranger) = signer(2);
    let mut registry = funded_registry(&[payer, stranger]);
    let signers = SignerSet::new(payer, []);
    let old_ns = Namespace::from_label("arcadia");
    registry.initialize(old_ns, payer, &signers).unwrap();

    let err = registry
        .migrate_config_namespace(
            old_ns,
            Namespace::from_label("hijacked"),
            &SignerSet::new(stranger, []),
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidAuthority));
}

// ---------------------------------------------------------------------------
// Collection authority rotation
// ---------------------------------------------------------------------------

#[test]
fn rotation_uses_canonical_call_against_current_deployment() {
    let (_, payer) = signer(1);
    let mut registry = funded_registry(&[payer]);
    let namespace = Namespace::from_label("arcadia");
    let signers = SignerSet::new(payer, []);
    let config = registry.initialize(namespace, payer, &signers).unwrap();

    let anchor = Address::from_bytes([0xA7; 32]);
    let (auth, _) = authority_address(&config);
    registry
        .metadata_mut()
        .register_collection_anchor(anchor, auth, CollectionSizing::Unsized);

    let (_, new_owner) = signer(3);
    let call = registry
        .rotate_collection_authority(namespace, anchor, new_owner, &signers)
        .unwrap();
    assert_eq!(call, RotationCall::V2);
    assert_eq!(
        registry.metadata().record(&anchor).unwrap().update_authority,
        new_owner
    );
}

#[test]
fn rotation_falls_back_against_legacy_deployment() {
    let (_, payer) = signer(1);
    let mut registry = Registry::new(MemoryMetadata::legacy_only());
    registry.credit_payer(payer, FUNDING).unwrap();
    let namespace = Namespace::from_label("arcadia");
    let signers = SignerSet::new(payer, []);
    let config = registry.initialize(namespace, payer, &signers).unwrap();

    let anchor = Address::from_bytes([0xA7; 32]);
    let (auth, _) = authority_address(&config);
    registry
        .metadata_mut()
        .register_collection_anchor(anchor, auth, CollectionSizing::Unsized);

    let (_, new_owner) = signer(3);
    let call = registry
        .rotate_collection_authority(namespace, anchor, new_owner, &signers)
        .unwrap();
    assert_eq!(call, RotationCall::Legacy);
    assert_eq!(
        registry.metadata().record(&anchor).unwrap().update_authority,
        new_owner
    );
}

#[test]
fn rotation_away_breaks_future_verification() {
    // Rotating the anchor's authority to an outside key means the
    // registry can no longer verify items into it — by design.
    let (_, payer) = signer(1);
    let mut registry = funded_registry(&[payer]);
    let namespace = Namespace::from_label("arcadia");
    let signers = SignerSet::new(payer, []);
    let config = registry.initialize(namespace, payer, &signers).unwrap();

    let anchor = Address::from_bytes([0xA7; 32]);
    let (auth, _) = authority_address(&config);
    registry
        .metadata_mut()
        .register_collection_anchor(anchor, auth, CollectionSizing::Unsized);

    let (_, new_owner) = signer(3);
    registry
        .rotate_collection_authority(namespace, anchor, new_owner, &signers)
        .unwrap();

    let err = registry
        .mint_object_nft(mint_args(namespace, 1, payer, anchor), &signers)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Metadata(_)));
    // Atomic: the failed mint left nothing behind.
    assert!(registry.state().manifest_by_object_id(&namespace, 1).is_none());
}
