//! Interactive CLI demo of the full EMBER registry lifecycle.
//!
//! Walks through namespace initialization, collection anchor setup, a
//! first mint (sized path), a retried duplicate, an ownership-gated
//! manifest update, and a namespace migration. The output uses ANSI
//! escape codes for colored, storytelling-style terminal rendering.
//!
//! Run with:
//!   cargo run --example demo --release

use ember_protocol::address::Address;
use ember_protocol::crypto::keys::EmberKeypair;
use ember_protocol::envelope::SignerSet;
use ember_protocol::token::holding_address;

use ember_registry::metadata::{CollectionSizing, CreatorShare, MemoryMetadata, MetadataProtocol};
use ember_registry::state::authority_address;
use ember_registry::{MintObjectArgs, Namespace, Registry, UpdateManifestArgs};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

fn section(num: u32, title: &str) {
    println!();
    println!(
        "{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]=============================================================={RESET}"
    );
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!(
        "{CYAN}------------------------------------------------------------------------{RESET}"
    );
}

fn note(text: &str) {
    println!("{DIM}{CYAN}  >> {text}{RESET}");
}

fn done(text: &str) {
    println!("{GREEN}  ok {RESET}{text}");
}

fn main() {
    println!();
    println!("{BOLD}{WHITE}EMBER REGISTRY -- Lifecycle Demo{RESET}");

    // -----------------------------------------------------------------
    section(1, "Initialize a namespace");
    // -----------------------------------------------------------------
    let operator_kp = EmberKeypair::generate();
    let operator = Address::from_public_key(&operator_kp.public_key());
    let signers = SignerSet::new(operator, []);
    let namespace = Namespace::from_label("arcadia");

    let mut registry = Registry::new(MemoryMetadata::new());
    registry
        .credit_payer(operator, 1_000_000_000)
        .expect("faucet");
    let config = registry
        .initialize(namespace, operator, &signers)
        .expect("initialize");
    note(&format!("namespace    {namespace}"));
    note(&format!("config       {config}"));
    done("configuration + keyless mint authority created");

    // -----------------------------------------------------------------
    section(2, "Register a collection anchor (external collaborator)");
    // -----------------------------------------------------------------
    let anchor = Address::from_bytes([0xA7; 32]);
    let (auth, _) = authority_address(&config);
    registry
        .metadata_mut()
        .register_collection_anchor(anchor, auth, CollectionSizing::Sized(0));
    note(&format!("anchor       {anchor} (sized, count 0)"));
    done("anchor owned by the namespace's mint authority");

    // -----------------------------------------------------------------
    section(3, "First mint for object #7");
    // -----------------------------------------------------------------
    let collector_kp = EmberKeypair::generate();
    let collector = Address::from_public_key(&collector_kp.public_key());
    let args = MintObjectArgs {
        namespace,
        object_id: 7,
        manifest_uri: "ipfs://manifests/7".into(),
        manifest_hash: [0x11; 32],
        metadata_name: "Relic #7".into(),
        metadata_symbol: "RLC".into(),
        seller_fee_basis_points: 500,
        creators: vec![CreatorShare {
            address: operator,
            verified: true,
            share: 100,
        }],
        recipient: collector,
        collection_mint: anchor,
    };
    let outcome = registry
        .mint_object_nft(args.clone(), &signers)
        .expect("first mint");
    note(&format!("mint         {}", outcome.mint));
    note(&format!("verification {:?}", outcome.verification));
    note(&format!(
        "anchor count {}",
        match registry.metadata().sizing_of(&anchor).unwrap() {
            CollectionSizing::Sized(n) => n.to_string(),
            CollectionSizing::Unsized => "-".into(),
        }
    ));
    done("one unit issued, supply sealed, membership verified");

    // -----------------------------------------------------------------
    section(4, "Retried duplicate is a cheap no-op");
    // -----------------------------------------------------------------
    let retry = registry
        .mint_object_nft(args, &signers)
        .expect("retried duplicate");
    note(&format!("first_mint   {}", retry.first_mint));
    note(&format!(
        "supply       {}",
        registry.state().tokens().mint(&retry.mint).unwrap().supply
    ));
    done("no new issuance, no second verification");

    // -----------------------------------------------------------------
    section(5, "Holder updates the manifest");
    // -----------------------------------------------------------------
    let (holding, _) = holding_address(&collector, &outcome.mint);
    registry
        .update_object_manifest(
            UpdateManifestArgs {
                namespace,
                object_id: 7,
                manifest_hash: [0x22; 32],
                metadata_uri: "ipfs://manifests/7-v2".into(),
                is_active: true,
                holding,
            },
            &SignerSet::new(collector, []),
        )
        .expect("holder update");
    let manifest = registry
        .state()
        .manifest_by_object_id(&namespace, 7)
        .unwrap();
    note(&format!("uri          {}", manifest.metadata_uri));
    done("content fields rewritten, identity untouched");

    // -----------------------------------------------------------------
    section(6, "Migrate the namespace");
    // -----------------------------------------------------------------
    let new_namespace = Namespace::from_label("arcadia-v2");
    let new_config = registry
        .migrate_config_namespace(namespace, new_namespace, &signers)
        .expect("migration");
    note(&format!("new config   {new_config}"));
    note(&format!(
        "old config still live: {}",
        registry.state().config_by_namespace(&namespace).is_some()
    ));
    done("authority and counters copied; old namespace left intact");

    println!();
    println!(
        "{BOLD}{GREEN}Lifecycle complete.{RESET} {} events emitted.",
        registry.events().len()
    );
    println!();
}
