// Copyright (c) 2026 Emberworks. MIT License.
// See LICENSE for details.

//! # EMBER Registry Node
//!
//! Entry point for the `ember-node` binary. Parses CLI arguments,
//! initializes logging and metrics, and serves the registry's HTTP API.
//!
//! The binary supports four subcommands:
//!
//! - `run`     — start the registry node
//! - `init`    — initialize a data directory and generate an operator key
//! - `status`  — query a running node's status endpoint
//! - `version` — print build version information

mod api;
mod cli;
mod logging;
mod metrics;

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::signal;

use ember_protocol::address::Address;
use ember_registry::metadata::MemoryMetadata;
use ember_registry::{Registry, RegistryPolicy};

use cli::{Commands, EmberNodeCli};
use logging::LogFormat;
use metrics::NodeMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = EmberNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Init(args) => init_node(args),
        Commands::Status(args) => query_status(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the registry node: API server and metrics endpoint.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        "ember_node=info,ember_registry=info,tower_http=debug",
        LogFormat::from_str_lossy(&args.log_format),
    );

    tracing::info!(
        rpc_port = args.rpc_port,
        metrics_port = args.metrics_port,
        network = %args.network,
        faucet = !args.no_faucet,
        "starting ember-node"
    );

    // --- Deployer allow-list ---
    let mut allowed_deployers = Vec::with_capacity(args.allowed_deployers.len());
    for entry in &args.allowed_deployers {
        let address = Address::from_base58(entry)
            .with_context(|| format!("bad allow-list address: {entry}"))?;
        allowed_deployers.push(address);
    }
    if !allowed_deployers.is_empty() {
        tracing::info!(count = allowed_deployers.len(), "deployer allow-list loaded");
    }

    // --- Registry ---
    let registry = Registry::with_policy(
        MemoryMetadata::new(),
        RegistryPolicy { allowed_deployers },
    );
    let registry = Arc::new(RwLock::new(registry));

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new());

    // --- Application state ---
    let app_state = api::AppState {
        version: format!(
            "{} (protocol {})",
            env!("CARGO_PKG_VERSION"),
            ember_protocol::config::PROTOCOL_VERSION,
        ),
        network: args.network.clone(),
        faucet_enabled: !args.no_faucet,
        registry,
        metrics: Arc::clone(&node_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.rpc_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {api_addr}"))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {metrics_addr}"))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("ember-node stopped");
    Ok(())
}

/// Initializes a data directory and generates an operator keypair.
fn init_node(args: cli::InitArgs) -> Result<()> {
    logging::init_logging("ember_node=info", LogFormat::Pretty);

    let data_dir = &args.data_dir;
    tracing::info!(data_dir = %data_dir.display(), network = %args.network, "initializing node");

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;

    // Generate the operator keypair.
    let keypair = ember_protocol::crypto::keys::EmberKeypair::generate();
    let address = Address::from_public_key(&keypair.public_key());

    // Write the secret key to a file inside the data directory.
    let key_path = data_dir.join("operator.key");
    std::fs::write(&key_path, hex::encode(keypair.to_bytes()))
        .with_context(|| format!("failed to write operator key to {}", key_path.display()))?;

    // Restrict permissions on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&key_path, std::fs::Permissions::from_mode(0o600))?;
    }

    tracing::info!(
        address = %address,
        key_path = %key_path.display(),
        "operator keypair generated"
    );

    println!("Node initialized successfully.");
    println!("  Data directory : {}", data_dir.display());
    println!("  Network        : {}", args.network);
    println!("  Operator key   : {}", key_path.display());
    println!("  Address        : {}", address);

    Ok(())
}

/// Queries a running node's status endpoint and prints the result.
async fn query_status(args: cli::StatusArgs) -> Result<()> {
    let url = args.rpc_url.trim_end_matches('/');
    let body = http_get(&format!("{url}/status")).await?;
    println!("{}", body);
    Ok(())
}

/// Minimal HTTP/1.1 GET over a raw TCP stream.
///
/// The status subcommand is the only HTTP client in the binary; pulling in
/// a full client library for one request is not worth the dependency.
async fn http_get(url: &str) -> Result<String> {
    let rest = url
        .strip_prefix("http://")
        .ok_or_else(|| anyhow::anyhow!("only http:// URLs are supported: {url}"))?;
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, "/"),
    };
    let (host, port) = match authority.rfind(':') {
        Some(i) => (
            &authority[..i],
            authority[i + 1..]
                .parse::<u16>()
                .context("bad port in URL")?,
        ),
        None => (authority, 80),
    };

    let addr = format!("{host}:{port}");
    let mut stream = tokio::net::TcpStream::connect(&addr)
        .await
        .with_context(|| format!("failed to connect to {addr}"))?;

    let request = format!("GET {path} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n");

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    stream.write_all(request.as_bytes()).await?;
    stream.shutdown().await?;

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await?;
    let response = String::from_utf8_lossy(&buf);

    // Everything after the first blank line is the body.
    let body = response
        .split_once("\r\n\r\n")
        .map(|(_, b)| b.to_string())
        .unwrap_or_else(|| response.to_string());
    Ok(body)
}

/// Prints version information to stdout.
fn print_version() {
    println!("ember-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol   {}", ember_protocol::config::PROTOCOL_VERSION);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_operator_key() {
        let dir = tempfile::tempdir().unwrap();
        let args = cli::InitArgs {
            data_dir: dir.path().join("node"),
            network: "devnet".into(),
        };
        // The only test in this binary that initializes logging, so the
        // once-per-process subscriber rule holds.
        init_node(args).unwrap();

        let key_path = dir.path().join("node").join("operator.key");
        let key_hex = std::fs::read_to_string(&key_path).unwrap();
        assert_eq!(key_hex.len(), 64);
        assert!(hex::decode(key_hex.trim()).is_ok());
    }
}
