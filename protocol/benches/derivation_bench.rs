// Address-derivation and envelope benchmarks for the EMBER protocol.
//
// Covers derived-address search (the off-curve bump walk), re-derivation
// with a known bump, and envelope signing/verification — the three
// operations on every instruction's hot path.

use criterion::{criterion_group, criterion_main, Criterion};

use ember_protocol::address::{derive_address, find_derived_address};
use ember_protocol::crypto::keys::EmberKeypair;
use ember_protocol::envelope::SignedEnvelope;

fn bench_find_derived_address(c: &mut Criterion) {
    let config = find_derived_address(&[b"config", &[7u8; 32]]).unwrap().0;
    let object_id = 42u64.to_le_bytes();

    c.bench_function("address/find_derived", |b| {
        b.iter(|| find_derived_address(&[b"object_manifest", config.as_bytes(), &object_id]));
    });
}

fn bench_derive_with_known_bump(c: &mut Criterion) {
    let config = find_derived_address(&[b"config", &[7u8; 32]]).unwrap().0;
    let object_id = 42u64.to_le_bytes();
    let seeds: &[&[u8]] = &[b"object_manifest", config.as_bytes(), &object_id];
    let (_, bump) = find_derived_address(seeds).unwrap();

    c.bench_function("address/derive_known_bump", |b| {
        b.iter(|| derive_address(seeds, bump));
    });
}

fn bench_envelope_roundtrip(c: &mut Criterion) {
    let keypair = EmberKeypair::generate();
    let payload: (u64, String) = (42, "mint object".into());

    c.bench_function("envelope/sign", |b| {
        b.iter(|| {
            let mut envelope = SignedEnvelope::new(&payload).unwrap();
            envelope.sign(&keypair);
            envelope
        });
    });

    let mut envelope = SignedEnvelope::new(&payload).unwrap();
    envelope.sign(&keypair);

    c.bench_function("envelope/verify", |b| {
        b.iter(|| envelope.verify().unwrap());
    });
}

criterion_group!(
    benches,
    bench_find_derived_address,
    bench_derive_with_known_bump,
    bench_envelope_roundtrip
);
criterion_main!(benches);
