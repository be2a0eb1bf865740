// Mint-pipeline benchmarks for the EMBER registry.
//
// Covers the first mint (all nine phases, both verification paths) and
// the retried duplicate (the cheap re-validation path). The gap between
// the two is the whole point of the `minted` gate.

use criterion::{criterion_group, criterion_main, Criterion};

use ember_protocol::address::Address;
use ember_protocol::envelope::SignerSet;

use ember_registry::metadata::{CollectionSizing, CreatorShare, MemoryMetadata};
use ember_registry::state::authority_address;
use ember_registry::{MintObjectArgs, Namespace, Registry};

fn payer() -> Address {
    Address::from_bytes([0x42; 32])
}

fn fresh_registry(sizing: CollectionSizing) -> (Registry<MemoryMetadata>, Namespace, Address) {
    let namespace = Namespace::from_label("bench");
    let anchor = Address::from_bytes([0xA7; 32]);

    let mut registry = Registry::new(MemoryMetadata::new());
    registry.credit_payer(payer(), u64::MAX / 2).unwrap();
    let signers = SignerSet::new(payer(), []);
    let config = registry.initialize(namespace, payer(), &signers).unwrap();
    let (auth, _) = authority_address(&config);
    registry
        .metadata_mut()
        .register_collection_anchor(anchor, auth, sizing);

    (registry, namespace, anchor)
}

fn args(namespace: Namespace, object_id: u64, anchor: Address) -> MintObjectArgs {
    MintObjectArgs {
        namespace,
        object_id,
        manifest_uri: format!("ipfs://manifests/{object_id}"),
        manifest_hash: [0x11; 32],
        metadata_name: "Relic".into(),
        metadata_symbol: "RLC".into(),
        seller_fee_basis_points: 500,
        creators: vec![CreatorShare {
            address: payer(),
            verified: true,
            share: 100,
        }],
        recipient: payer(),
        collection_mint: anchor,
    }
}

fn bench_first_mint(c: &mut Criterion) {
    let signers = SignerSet::new(payer(), []);

    c.bench_function("mint/first_mint_sized", |b| {
        let (mut registry, namespace, anchor) = fresh_registry(CollectionSizing::Sized(0));
        let mut object_id = 0u64;
        b.iter(|| {
            object_id += 1;
            registry
                .mint_object_nft(args(namespace, object_id, anchor), &signers)
                .unwrap()
        });
    });

    c.bench_function("mint/first_mint_unsized", |b| {
        let (mut registry, namespace, anchor) = fresh_registry(CollectionSizing::Unsized);
        let mut object_id = 0u64;
        b.iter(|| {
            object_id += 1;
            registry
                .mint_object_nft(args(namespace, object_id, anchor), &signers)
                .unwrap()
        });
    });
}

fn bench_retried_duplicate(c: &mut Criterion) {
    let signers = SignerSet::new(payer(), []);
    let (mut registry, namespace, anchor) = fresh_registry(CollectionSizing::Sized(0));
    registry
        .mint_object_nft(args(namespace, 1, anchor), &signers)
        .unwrap();

    c.bench_function("mint/retried_duplicate", |b| {
        b.iter(|| {
            registry
                .mint_object_nft(args(namespace, 1, anchor), &signers)
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_first_mint, bench_retried_duplicate);
criterion_main!(benches);
