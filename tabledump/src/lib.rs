//! Library module for the tabledump binary.
//!
//! Exposes the CLI argument structures and the command implementations so
//! integration tests can drive the pipeline without spawning a process. The
//! binary entry point is in main.rs.

pub mod export;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tabledump_core::config::{DEFAULT_BATCH_SIZE, DEFAULT_THROTTLE_MS};

/// CLI argument structure
#[derive(Parser)]
#[command(name = "tabledump")]
#[command(about = "Bulk export of a hosted table to a local CSV snapshot")]
#[command(version)]
#[command(long_about = "
Tabledump - paginated bulk export for PostgREST-style table APIs

Fetches every row of a remote table in bounded windows, accumulates them in
memory, and writes one CSV snapshot. A separate preflight command verifies
credentials and connectivity before any export is attempted.

CREDENTIALS:
  SOURCE_ENDPOINT     Remote API base location
  SOURCE_ACCESS_KEY   Service-level access key (never logged)

EXAMPLES:
  tabledump verify
  tabledump export
  tabledump export --table properties --batch-size 500 -o snapshot.csv
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Command {
    /// Export all rows of the remote table to a CSV file
    Export(ExportArgs),
    /// Verify credentials and remote connectivity
    Verify(VerifyArgs),
}

/// Credential pair and target table, shared by both commands
#[derive(Args)]
pub struct SourceArgs {
    /// Remote API base location
    #[arg(long, env = "SOURCE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Service access key
    #[arg(long, env = "SOURCE_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Table to export
    #[arg(long, default_value = "properties")]
    pub table: String,
}

/// Arguments for the export pipeline
#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Number of rows to fetch per request
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: u32,

    /// Delay between page requests in milliseconds
    #[arg(long, default_value_t = DEFAULT_THROTTLE_MS)]
    pub throttle_ms: u64,

    /// Output file path (defaults to data/raw/<table>.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the preflight check
#[derive(Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Global verbosity flags
#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all output except errors")]
    pub quiet: bool,
}
