//! Paginated bulk-export tool for hosted table APIs.
//!
//! Two entry points, sharing no runtime state:
//! - `export` fetches every row of the remote table in bounded windows and
//!   writes one CSV snapshot
//! - `verify` checks credential presence and remote connectivity without
//!   touching any data

use clap::Parser;
use tabledump::{Cli, Command, export};
use tabledump_core::init_logging;
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    match cli.command {
        Command::Export(args) => {
            if let Err(e) = export::run_export(&args).await {
                error!("Export failed: {}", e);
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Verify(args) => {
            let report = export::run_verify(&args).await;
            if !report.all_ok() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
