//! CSV materialization of an accumulated dataset.
//!
//! The dataset is serialized into an in-memory buffer first and written to
//! durable storage in a single operation, so the artifact is never observed
//! half-written.

use std::path::Path;

use tracing::info;

use crate::dataset::Dataset;
use crate::error::{Result, TabledumpError};

/// Writes the dataset to `path` as a CSV file.
///
/// No-op when the dataset is empty. Otherwise the parent directories are
/// created as needed and any existing file at `path` is overwritten. The
/// header row holds the dataset's column list; each record renders missing
/// keys as empty fields.
///
/// # Errors
/// Returns `Csv` on serialization failure and `Io` when directories cannot
/// be created or the file cannot be written.
pub async fn write_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    if dataset.is_empty() {
        info!("No data to export");
        return Ok(());
    }

    let buffer = serialize_csv(dataset)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            TabledumpError::io_failed(
                format!("Failed to create directory {}", parent.display()),
                e,
            )
        })?;
    }

    tokio::fs::write(path, buffer).await.map_err(|e| {
        TabledumpError::io_failed(format!("Failed to write to {}", path.display()), e)
    })?;

    info!("Data exported to {}", path.display());
    Ok(())
}

/// Serializes the dataset into CSV bytes: one header line, one line per row.
fn serialize_csv(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(dataset.columns())
        .map_err(|e| TabledumpError::csv_failed("Failed to write header row", e))?;

    for row in dataset.rows() {
        let record: Vec<String> = dataset
            .columns()
            .iter()
            .map(|column| render_field(row.get(column)))
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| TabledumpError::csv_failed("Failed to write record", e))?;
    }

    writer
        .into_inner()
        .map_err(|e| TabledumpError::csv_failed("Failed to flush CSV buffer", e.into_error().into()))
}

/// Renders one cell value.
///
/// Scalars render naturally (nulls as empty fields); nested arrays and
/// objects render as compact JSON text.
fn render_field(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        Some(nested) => nested.to_string(),
    }
}
