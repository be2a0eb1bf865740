// Copyright (c) 2026 Emberworks. MIT License.
// See LICENSE for details.

//! # EMBER Protocol — Substrate Primitives
//!
//! The foundation layer of EMBER, a governed registry for ownership-bearing
//! collectible objects. This crate knows nothing about namespaces, manifests,
//! or collections — it provides the primitives every record and instruction
//! above it is built from:
//!
//! - **crypto** — BLAKE3/SHA-256 hashing and Ed25519 keys and signatures.
//!   Don't roll your own.
//! - **address** — 32-byte addresses, base58 display, and deterministic
//!   derived addresses that are provably keyless (off-curve).
//! - **token** — the single-supply token ledger: mints, holdings, sealing.
//! - **deposit** — rent-style deposit arithmetic and the payer balance sheet.
//! - **envelope** — the signed instruction envelope; the only way signer
//!   authority enters the system.
//! - **config** — protocol constants and field limits.
//!
//! ## Design Philosophy
//!
//! 1. Every address is deterministic. If you can't recompute it from seeds,
//!    it doesn't belong here.
//! 2. Keyless means keyless — derived addresses are rejected if they decode
//!    to a valid Ed25519 point, so no keypair can ever sign for one.
//! 3. Checked arithmetic on anything that resembles money.
//! 4. Explicit `Result` returns everywhere a caller can do something about
//!    the failure.

pub mod address;
pub mod config;
pub mod crypto;
pub mod deposit;
pub mod envelope;
pub mod token;
