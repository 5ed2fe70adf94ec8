//! Command implementations: the export pipeline and the preflight check.

use tabledump_core::{
    AccessKey, Dataset, ExportConfig, FetchOptions, Result, RestTableClient, VerifyReport,
    fetch_all, preflight, write_csv,
};
use tracing::{error, info};

use crate::{ExportArgs, VerifyArgs};

/// Builds and validates the run configuration from CLI arguments.
fn build_config(args: &ExportArgs) -> Result<ExportConfig> {
    let endpoint = args.source.endpoint.clone().unwrap_or_default();
    let access_key = AccessKey::new(args.source.access_key.clone().unwrap_or_default());

    let fetch = FetchOptions::new()
        .with_batch_size(args.batch_size)
        .with_throttle_ms(args.throttle_ms);

    let mut config =
        ExportConfig::new(endpoint, access_key, args.source.table.as_str()).with_fetch(fetch);
    if let Some(output) = &args.output {
        config = config.with_output(output.clone());
    }

    config.validate()?;
    Ok(config)
}

/// Runs the full export pipeline: fetch, accumulate, materialize.
///
/// Exits with success when the source is empty; nothing is written in that
/// case.
pub async fn run_export(args: &ExportArgs) -> Result<()> {
    let config = build_config(args)?;

    info!("Connecting to {}", config.endpoint);
    let client = RestTableClient::new(&config.endpoint, config.access_key.clone())?;

    let rows = fetch_all(&client, &config.table, &config.fetch).await.map_err(|e| {
        error!("Fetch failed: {}", e);
        e
    })?;

    let dataset = Dataset::from_rows(rows);
    if dataset.is_empty() {
        println!("No data to export.");
        return Ok(());
    }

    write_csv(&dataset, &config.output).await.map_err(|e| {
        error!("Failed to write output file: {}", e);
        e
    })?;

    println!("Export completed successfully");
    println!("Output: {}", config.output.display());
    println!("Rows: {}", dataset.row_count());
    println!("Columns: {}", dataset.column_count());
    println!("Column names: {}", dataset.columns().join(", "));
    println!("Fetched at: {}", dataset.fetched_at().to_rfc3339());

    Ok(())
}

/// Runs the preflight check and prints the findings.
///
/// The caller decides the exit code from the returned report.
pub async fn run_verify(args: &VerifyArgs) -> VerifyReport {
    println!("Checking environment variables...");

    let report = preflight::verify(
        args.source.endpoint.as_deref(),
        args.source.access_key.as_deref(),
        &args.source.table,
    )
    .await;

    println!(
        "SOURCE_ENDPOINT: {}",
        if report.endpoint_set { "set" } else { "not set" }
    );
    println!(
        "SOURCE_ACCESS_KEY: {}",
        if report.access_key_set { "set" } else { "not set" }
    );

    if !report.credentials_ok() {
        println!("Cannot test connection: missing required credentials");
        return report;
    }

    if report.connection_ok {
        match &report.detail {
            Some(detail) => println!("Connection successful ({})", detail),
            None => println!("Connection successful"),
        }
    } else {
        println!(
            "Connection failed: {}",
            report.detail.as_deref().unwrap_or("unknown error")
        );
    }

    report
}
