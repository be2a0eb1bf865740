//! # CLI Interface
//!
//! Defines the command-line argument structure for `ember-node` using
//! `clap` derive. Supports four subcommands: `run`, `init`, `status`,
//! and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// EMBER registry node.
///
/// Hosts the governed object registry: accepts signed instruction
/// envelopes over HTTP, serves registry state queries and the event log,
/// and exposes Prometheus metrics.
#[derive(Parser, Debug)]
#[command(
    name = "ember-node",
    about = "EMBER object registry node",
    version,
    propagate_version = true
)]
pub struct EmberNodeCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the EMBER node binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the registry node.
    Run(RunArgs),
    /// Initialize a data directory and generate an operator keypair.
    Init(InitArgs),
    /// Query the status of a running node via its HTTP endpoint.
    Status(StatusArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Port for the HTTP API.
    #[arg(long, env = "EMBER_RPC_PORT", default_value_t = 8480)]
    pub rpc_port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "EMBER_METRICS_PORT", default_value_t = 8481)]
    pub metrics_port: u16,

    /// Network label reported by `/status` (e.g. devnet, testnet).
    #[arg(long, env = "EMBER_NETWORK", default_value = "devnet")]
    pub network: String,

    /// Base58 addresses to put on the deployer allow-list, repeatable.
    #[arg(long = "allow-deployer", env = "EMBER_ALLOWED_DEPLOYERS", value_delimiter = ',')]
    pub allowed_deployers: Vec<String>,

    /// Disable the dev faucet endpoint. On a devnet the faucet is how
    /// payers get funded; anywhere else it should be off.
    #[arg(long, env = "EMBER_NO_FAUCET", default_value_t = false)]
    pub no_faucet: bool,

    /// Log format: "pretty" or "json".
    #[arg(long, env = "EMBER_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Path to the data directory to initialize.
    #[arg(long, short = 'd', env = "EMBER_DATA_DIR", default_value = "~/.ember")]
    pub data_dir: PathBuf,

    /// Network label to record: mainnet, testnet, or devnet.
    #[arg(long, default_value = "devnet")]
    pub network: String,
}

/// Arguments for the `status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// HTTP endpoint of the running node.
    #[arg(long, default_value = "http://127.0.0.1:8480")]
    pub rpc_url: String,
}
