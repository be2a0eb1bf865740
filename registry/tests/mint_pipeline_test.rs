//! Integration tests for the mint pipeline.
//!
//! These exercise the full state machine across module boundaries: first
//! mints through both collection-verification paths, retried duplicates,
//! the pause gate, creator invariants, and the atomicity guarantee that a
//! failure anywhere in the pipeline leaves no trace.

use ember_protocol::address::Address;
use ember_protocol::crypto::keys::EmberKeypair;
use ember_protocol::envelope::SignerSet;
use ember_protocol::token::holding_address;

use ember_registry::metadata::{CollectionSizing, CreatorShare, MemoryMetadata, MetadataProtocol};
use ember_registry::state::authority_address;
use ember_registry::{
    MintObjectArgs, Namespace, Registry, RegistryError, RegistryEvent, VerificationPath,
};

/// Plenty of motes for any number of record deposits in one test.
const FUNDING: u64 = 1_000_000_000;

fn signer(seed: u8) -> (EmberKeypair, Address) {
    let kp = EmberKeypair::from_seed(&[seed; 32]);
    let addr = Address::from_public_key(&kp.public_key());
    (kp, addr)
}

/// A registry with one initialized namespace and a registered collection
/// anchor of the given sizing. Returns (registry, namespace, payer,
/// anchor mint).
fn setup(sizing: CollectionSizing) -> (Registry<MemoryMetadata>, Namespace, Address, Address) {
    let (_, payer) = signer(1);
    let namespace = Namespace::from_label("arcadia");
    let anchor = Address::from_bytes([0xA7; 32]);

    let mut registry = Registry::new(MemoryMetadata::new());
    registry.credit_payer(payer, FUNDING).unwrap();

    let signers = SignerSet::new(payer, []);
    let config = registry.initialize(namespace, payer, &signers).unwrap();

    // The anchor's owner (external to the registry) hands update authority
    // to the namespace's keyless mint authority, as the mint flow requires.
    let (auth, _) = authority_address(&config);
    registry
        .metadata_mut()
        .register_collection_anchor(anchor, auth, sizing);

    (registry, namespace, payer, anchor)
}

fn mint_args(
    namespace: Namespace,
    object_id: u64,
    creator: Address,
    recipient: Address,
    anchor: Address,
) -> MintObjectArgs {
    MintObjectArgs {
        namespace,
        object_id,
        manifest_uri: format!("ipfs://manifests/{object_id}"),
        manifest_hash: [0x11; 32],
        metadata_name: format!("Relic #{object_id}"),
        metadata_symbol: "RLC".into(),
        seller_fee_basis_points: 500,
        creators: vec![CreatorShare {
            address: creator,
            verified: true,
            share: 100,
        }],
        recipient,
        collection_mint: anchor,
    }
}

// ---------------------------------------------------------------------------
// First-mint happy paths
// ---------------------------------------------------------------------------

#[test]
fn first_mint_via_unsized_path() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let signers = SignerSet::new(payer, []);

    let outcome = registry
        .mint_object_nft(mint_args(namespace, 7, payer, recipient, anchor), &signers)
        .unwrap();

    assert!(outcome.first_mint);
    assert_eq!(outcome.verification, Some(VerificationPath::Unsized));
    assert_eq!(outcome.object_id, 7);

    // Manifest: minted flipped, identity recorded.
    let manifest = registry
        .state()
        .manifest_by_object_id(&namespace, 7)
        .unwrap();
    assert!(manifest.minted);
    assert!(manifest.is_active);
    assert_eq!(manifest.creator, payer);
    assert_eq!(manifest.mint, outcome.mint);

    // Exactly one unit, held by the recipient, supply sealed.
    assert_eq!(registry.state().tokens().balance_of(&recipient, &outcome.mint), 1);
    let mint_record = registry.state().tokens().mint(&outcome.mint).unwrap();
    assert_eq!(mint_record.supply, 1);
    assert_eq!(mint_record.max_supply, Some(1));

    // Object count incremented by exactly one.
    let config = registry.state().config_by_namespace(&namespace).unwrap();
    assert_eq!(config.object_count, 1);

    // External record exists, collection membership verified.
    let record = registry.metadata().record(&outcome.mint).unwrap();
    assert_eq!(record.uri, "ipfs://manifests/7");
    assert!(record.collection.unwrap().verified);
    assert!(registry.metadata().has_master_record(&outcome.mint));

    // The mint-completed event is the last thing in the log.
    let last = registry.events().iter().last().unwrap();
    assert!(matches!(
        last.event,
        RegistryEvent::ObjectMinted { object_id: 7, .. }
    ));
}

#[test]
fn first_mint_via_sized_path_increments_anchor_count() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Sized(5));
    let (_, recipient) = signer(2);
    let signers = SignerSet::new(payer, []);

    let outcome = registry
        .mint_object_nft(mint_args(namespace, 7, payer, recipient, anchor), &signers)
        .unwrap();

    assert_eq!(outcome.verification, Some(VerificationPath::Sized));
    assert_eq!(
        registry.metadata().sizing_of(&anchor).unwrap(),
        CollectionSizing::Sized(6)
    );
}

#[test]
fn dispatch_follows_anchor_shape_not_client_input() {
    // Identical client args, different anchor shapes, different paths.
    for (sizing, expected) in [
        (CollectionSizing::Unsized, VerificationPath::Unsized),
        (CollectionSizing::Sized(0), VerificationPath::Sized),
    ] {
        let (mut registry, namespace, payer, anchor) = setup(sizing);
        let (_, recipient) = signer(2);
        let signers = SignerSet::new(payer, []);

        let outcome = registry
            .mint_object_nft(mint_args(namespace, 1, payer, recipient, anchor), &signers)
            .unwrap();
        assert_eq!(outcome.verification, Some(expected));
    }
}

// ---------------------------------------------------------------------------
// Idempotence & retried duplicates
// ---------------------------------------------------------------------------

#[test]
fn second_identical_mint_is_a_cheap_no_op() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Sized(0));
    let (_, recipient) = signer(2);
    let signers = SignerSet::new(payer, []);
    let args = mint_args(namespace, 7, payer, recipient, anchor);

    let first = registry.mint_object_nft(args.clone(), &signers).unwrap();
    assert!(first.first_mint);

    let manifest_before = registry
        .state()
        .manifest_by_object_id(&namespace, 7)
        .unwrap()
        .clone();

    let second = registry.mint_object_nft(args, &signers).unwrap();
    assert!(!second.first_mint);
    assert_eq!(second.verification, None);
    assert_eq!(second.mint, first.mint);

    // No second unit, no double count, anchor count moved exactly once.
    assert_eq!(registry.state().tokens().mint(&first.mint).unwrap().supply, 1);
    assert_eq!(registry.state().tokens().balance_of(&recipient, &first.mint), 1);
    assert_eq!(
        registry.state().config_by_namespace(&namespace).unwrap().object_count,
        1
    );
    assert_eq!(
        registry.metadata().sizing_of(&anchor).unwrap(),
        CollectionSizing::Sized(1)
    );

    // The manifest is bit-identical to before the retry.
    let manifest_after = registry
        .state()
        .manifest_by_object_id(&namespace, 7)
        .unwrap();
    assert_eq!(*manifest_after, manifest_before);
}

#[test]
fn retry_with_different_hash_rejected() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let signers = SignerSet::new(payer, []);

    let args = mint_args(namespace, 7, payer, recipient, anchor);
    registry.mint_object_nft(args.clone(), &signers).unwrap();

    let mut tampered = args;
    tampered.manifest_hash = [0x22; 32];
    let err = registry.mint_object_nft(tampered, &signers).unwrap_err();
    assert!(matches!(err, RegistryError::ManifestMismatch));
}

#[test]
fn retry_may_omit_uri_but_not_contradict_it() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let signers = SignerSet::new(payer, []);

    let args = mint_args(namespace, 7, payer, recipient, anchor);
    registry.mint_object_nft(args.clone(), &signers).unwrap();

    // Empty URI on a retry means "whatever is stored".
    let mut omitted = args.clone();
    omitted.manifest_uri = String::new();
    assert!(registry.mint_object_nft(omitted, &signers).is_ok());

    // A different non-empty URI is a contradiction.
    let mut contradicting = args;
    contradicting.manifest_uri = "ipfs://somewhere-else".into();
    let err = registry.mint_object_nft(contradicting, &signers).unwrap_err();
    assert!(matches!(err, RegistryError::ManifestMismatch));
}

#[test]
fn remint_to_other_recipient_issues_nothing() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let (_, late_comer) = signer(3);
    let signers = SignerSet::new(payer, []);

    let args = mint_args(namespace, 7, payer, recipient, anchor);
    let first = registry.mint_object_nft(args.clone(), &signers).unwrap();

    let mut redirected = args;
    redirected.recipient = late_comer;
    let second = registry.mint_object_nft(redirected, &signers).unwrap();
    assert!(!second.first_mint);

    // The sealed supply means the late-comer gets an empty holding and
    // the original recipient keeps the only unit.
    assert_eq!(registry.state().tokens().balance_of(&recipient, &first.mint), 1);
    assert_eq!(registry.state().tokens().balance_of(&late_comer, &first.mint), 0);
    assert_eq!(registry.state().tokens().mint(&first.mint).unwrap().supply, 1);
}

// ---------------------------------------------------------------------------
// Pause gate
// ---------------------------------------------------------------------------

#[test]
fn paused_namespace_rejects_mints_before_any_state_change() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let signers = SignerSet::new(payer, []);

    registry.set_paused(namespace, true, &signers).unwrap();
    let balance_before = registry.state().balances().balance_of(&payer);

    let err = registry
        .mint_object_nft(mint_args(namespace, 7, payer, recipient, anchor), &signers)
        .unwrap_err();
    assert!(matches!(err, RegistryError::MintingPaused));

    // Nothing was created and nothing was paid.
    assert!(registry.state().manifest_by_object_id(&namespace, 7).is_none());
    assert_eq!(registry.state().balances().balance_of(&payer), balance_before);

    // Unpausing restores prior behavior without re-initialization.
    registry.set_paused(namespace, false, &signers).unwrap();
    let outcome = registry
        .mint_object_nft(mint_args(namespace, 7, payer, recipient, anchor), &signers)
        .unwrap();
    assert!(outcome.first_mint);
}

// ---------------------------------------------------------------------------
// Creator invariants
// ---------------------------------------------------------------------------

#[test]
fn creator_shares_must_sum_to_exactly_100() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let signers = SignerSet::new(payer, []);

    let mut args = mint_args(namespace, 7, payer, recipient, anchor);
    args.creators[0].share = 99;
    let err = registry.mint_object_nft(args, &signers).unwrap_err();
    assert!(matches!(
        err,
        RegistryError::InvalidCreatorShares { total: 99 }
    ));
}

#[test]
fn creator_list_must_include_manifest_creator() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let (_, outsider) = signer(4);
    let signers = SignerSet::new(payer, []);

    let mut args = mint_args(namespace, 7, payer, recipient, anchor);
    args.creators = vec![CreatorShare {
        address: outsider,
        verified: false,
        share: 100,
    }];
    let err = registry.mint_object_nft(args, &signers).unwrap_err();
    assert!(matches!(err, RegistryError::MissingManifestCreator));

    // Atomicity: the manifest created in phase 2 rolled back with the rest.
    assert!(registry.state().manifest_by_object_id(&namespace, 7).is_none());
}

#[test]
fn verified_co_creator_must_sign() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let (_, co_creator) = signer(5);

    let mut args = mint_args(namespace, 7, payer, recipient, anchor);
    args.creators = vec![
        CreatorShare {
            address: payer,
            verified: true,
            share: 60,
        },
        CreatorShare {
            address: co_creator,
            verified: true,
            share: 40,
        },
    ];

    // Without the co-creator's signature: rejected.
    let unsigned = SignerSet::new(payer, []);
    let err = registry
        .mint_object_nft(args.clone(), &unsigned)
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::CreatorMustSign { creator } if creator == co_creator
    ));

    // With it: accepted, and both creators land verified on the record.
    let co_signed = SignerSet::new(payer, [co_creator]);
    let outcome = registry.mint_object_nft(args, &co_signed).unwrap();
    let record = registry.metadata().record(&outcome.mint).unwrap();
    assert!(record.creators.iter().all(|c| c.verified));
}

#[test]
fn too_many_creators_rejected() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let signers = SignerSet::new(payer, []);

    let mut args = mint_args(namespace, 7, payer, recipient, anchor);
    args.creators = (0u8..6)
        .map(|i| CreatorShare {
            address: if i == 0 { payer } else { signer(10 + i).1 },
            verified: false,
            share: if i < 4 { 17 } else { 16 },
        })
        .collect();
    let err = registry.mint_object_nft(args, &signers).unwrap_err();
    assert!(matches!(err, RegistryError::TooManyCreators { count: 6, .. }));
}

#[test]
fn seller_fee_capped_at_ten_thousand() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let signers = SignerSet::new(payer, []);

    let mut args = mint_args(namespace, 7, payer, recipient, anchor);
    args.seller_fee_basis_points = 10_001;
    let err = registry.mint_object_nft(args, &signers).unwrap_err();
    assert!(matches!(
        err,
        RegistryError::InvalidSellerFee { basis_points: 10_001 }
    ));
}

// ---------------------------------------------------------------------------
// Atomicity
// ---------------------------------------------------------------------------

#[test]
fn failed_verification_rolls_back_every_phase() {
    let (_, payer) = signer(1);
    let namespace = Namespace::from_label("arcadia");
    let anchor = Address::from_bytes([0xA7; 32]);

    let mut registry = Registry::new(MemoryMetadata::new());
    registry.credit_payer(payer, FUNDING).unwrap();
    let signers = SignerSet::new(payer, []);
    let config = registry.initialize(namespace, payer, &signers).unwrap();

    // An anchor whose update authority is NOT the namespace's mint
    // authority: metadata creation succeeds, verification cannot.
    let (_, stranger) = signer(9);
    registry
        .metadata_mut()
        .register_collection_anchor(anchor, stranger, CollectionSizing::Unsized);

    let balance_before = registry.state().balances().balance_of(&payer);
    let events_before = registry.events().len();

    let (_, recipient) = signer(2);
    let err = registry
        .mint_object_nft(mint_args(namespace, 7, payer, recipient, anchor), &signers)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Metadata(_)));

    // Phases 2-7 all executed before the failure; none of it survived.
    assert!(registry.state().manifest_by_object_id(&namespace, 7).is_none());
    let (manifest_addr, _) = ember_registry::state::manifest_address(&config, 7);
    let (mint_addr, _) = ember_registry::state::mint_address(&manifest_addr);
    assert!(registry.state().tokens().mint(&mint_addr).is_none());
    assert!(registry.metadata().record(&mint_addr).is_none());
    assert_eq!(registry.state().balances().balance_of(&payer), balance_before);
    assert_eq!(registry.events().len(), events_before);
    assert_eq!(
        registry.state().config_by_namespace(&namespace).unwrap().object_count,
        0
    );
}

#[test]
fn underfunded_payer_leaves_no_trace() {
    let (_, payer) = signer(1);
    let (_, rich) = signer(6);
    let namespace = Namespace::from_label("arcadia");
    let anchor = Address::from_bytes([0xA7; 32]);

    let mut registry = Registry::new(MemoryMetadata::new());
    registry.credit_payer(rich, FUNDING).unwrap();
    // The rich signer initializes; the poor payer then tries to mint.
    let rich_signers = SignerSet::new(rich, []);
    let config = registry.initialize(namespace, rich, &rich_signers).unwrap();
    let (auth, _) = authority_address(&config);
    registry
        .metadata_mut()
        .register_collection_anchor(anchor, auth, CollectionSizing::Unsized);

    registry.credit_payer(payer, 10).unwrap(); // nowhere near a deposit
    let poor_signers = SignerSet::new(payer, []);
    let (_, recipient) = signer(2);

    let err = registry
        .mint_object_nft(mint_args(namespace, 7, payer, recipient, anchor), &poor_signers)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Deposit(_)));
    assert!(registry.state().manifest_by_object_id(&namespace, 7).is_none());
    assert_eq!(registry.state().balances().balance_of(&payer), 10);
}

// ---------------------------------------------------------------------------
// Ownership-gated update
// ---------------------------------------------------------------------------

#[test]
fn holder_can_update_exactly_the_mutable_fields() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let payer_signers = SignerSet::new(payer, []);

    let outcome = registry
        .mint_object_nft(mint_args(namespace, 7, payer, recipient, anchor), &payer_signers)
        .unwrap();

    let before = registry
        .state()
        .manifest_by_object_id(&namespace, 7)
        .unwrap()
        .clone();

    let (holding, _) = holding_address(&recipient, &outcome.mint);
    let holder_signers = SignerSet::new(recipient, []);
    registry
        .update_object_manifest(
            ember_registry::UpdateManifestArgs {
                namespace,
                object_id: 7,
                manifest_hash: [0x33; 32],
                metadata_uri: "ipfs://manifests/7-v2".into(),
                is_active: false,
                holding,
            },
            &holder_signers,
        )
        .unwrap();

    let after = registry.state().manifest_by_object_id(&namespace, 7).unwrap();
    // Exactly {hash, uri, is_active} changed.
    assert_eq!(after.manifest_hash, [0x33; 32]);
    assert_eq!(after.metadata_uri, "ipfs://manifests/7-v2");
    assert!(!after.is_active);
    // Identity fields bit-identical.
    assert_eq!(after.object_id, before.object_id);
    assert_eq!(after.config, before.config);
    assert_eq!(after.mint, before.mint);
    assert_eq!(after.creator, before.creator);
    assert_eq!(after.bump, before.bump);
    assert_eq!(after.mint_bump, before.mint_bump);
    assert!(after.minted);

    // The external record follows the registry.
    assert_eq!(
        registry.metadata().record(&outcome.mint).unwrap().uri,
        "ipfs://manifests/7-v2"
    );

    let last = registry.events().iter().last().unwrap();
    assert!(matches!(
        last.event,
        RegistryEvent::ManifestUpdated { object_id: 7, is_active: false, .. }
    ));
}

#[test]
fn non_holder_update_rejected() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let payer_signers = SignerSet::new(payer, []);

    let outcome = registry
        .mint_object_nft(mint_args(namespace, 7, payer, recipient, anchor), &payer_signers)
        .unwrap();

    // The payer presents the *recipient's* holding — owner mismatch.
    let (holding, _) = holding_address(&recipient, &outcome.mint);
    let err = registry
        .update_object_manifest(
            ember_registry::UpdateManifestArgs {
                namespace,
                object_id: 7,
                manifest_hash: [0x33; 32],
                metadata_uri: "ipfs://stolen".into(),
                is_active: true,
                holding,
            },
            &payer_signers,
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidOwnerHolding));

    // Untouched.
    let manifest = registry.state().manifest_by_object_id(&namespace, 7).unwrap();
    assert_eq!(manifest.metadata_uri, "ipfs://manifests/7");
}

#[test]
fn empty_holding_rejected() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let (_, late_comer) = signer(3);
    let signers = SignerSet::new(payer, []);

    let args = mint_args(namespace, 7, payer, recipient, anchor);
    let outcome = registry.mint_object_nft(args.clone(), &signers).unwrap();

    // A retried duplicate aimed at a different recipient leaves that
    // recipient with a zero-balance holding.
    let mut redirected = args;
    redirected.recipient = late_comer;
    registry.mint_object_nft(redirected, &signers).unwrap();

    let (empty_holding, _) = holding_address(&late_comer, &outcome.mint);
    let err = registry
        .update_object_manifest(
            ember_registry::UpdateManifestArgs {
                namespace,
                object_id: 7,
                manifest_hash: [0x44; 32],
                metadata_uri: "ipfs://nope".into(),
                is_active: true,
                holding: empty_holding,
            },
            &SignerSet::new(late_comer, []),
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotObjectHolder));
}

#[test]
fn oversized_uri_rejected_before_any_write() {
    let (mut registry, namespace, payer, anchor) = setup(CollectionSizing::Unsized);
    let (_, recipient) = signer(2);
    let signers = SignerSet::new(payer, []);

    let outcome = registry
        .mint_object_nft(mint_args(namespace, 7, payer, recipient, anchor), &signers)
        .unwrap();

    let (holding, _) = holding_address(&recipient, &outcome.mint);
    let err = registry
        .update_object_manifest(
            ember_registry::UpdateManifestArgs {
                namespace,
                object_id: 7,
                manifest_hash: [0x55; 32],
                metadata_uri: "x".repeat(129),
                is_active: true,
                holding,
            },
            &SignerSet::new(recipient, []),
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::UriTooLong { len: 129, .. }));
}
