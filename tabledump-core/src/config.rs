//! Export run configuration.
//!
//! Configuration is constructed once at process start from CLI arguments and
//! environment variables, then passed by reference into the verifier and the
//! export pipeline. There are no ambient globals; the credential pair lives
//! only as long as the run.

use std::fmt;
use std::path::PathBuf;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, TabledumpError};

/// Default number of rows requested per page.
pub const DEFAULT_BATCH_SIZE: u32 = 1000;

/// Default inter-batch pacing delay in milliseconds.
pub const DEFAULT_THROTTLE_MS: u64 = 1000;

/// Service-level access key, zeroized on drop.
///
/// The key is an opaque secret; `Debug` and `Display` never reveal it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessKey(String);

impl AccessKey {
    /// Wraps a raw key value.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the raw key for use in request headers.
    pub fn reveal(&self) -> &str {
        &self.0
    }

    /// Returns true if the key is empty or whitespace-only.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessKey(****)")
    }
}

impl fmt::Display for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

/// Pagination and pacing options for the fetch loop.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Number of rows to request per page (window size)
    pub batch_size: u32,
    /// Pacing delay between full pages (milliseconds); 0 disables pacing
    pub throttle_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            throttle_ms: DEFAULT_THROTTLE_MS,
        }
    }
}

impl FetchOptions {
    /// Creates fetch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the page size.
    pub fn with_batch_size(mut self, size: u32) -> Self {
        self.batch_size = size;
        self
    }

    /// Builder method to set the pacing delay.
    pub fn with_throttle_ms(mut self, ms: u64) -> Self {
        self.throttle_ms = ms;
        self
    }
}

/// Full configuration for one export run.
#[derive(Debug)]
pub struct ExportConfig {
    /// Remote API base location (`SOURCE_ENDPOINT`)
    pub endpoint: String,
    /// Service access key (`SOURCE_ACCESS_KEY`)
    pub access_key: AccessKey,
    /// Target table name
    pub table: String,
    /// Pagination and pacing options
    pub fetch: FetchOptions,
    /// Output file path for the CSV artifact
    pub output: PathBuf,
}

impl ExportConfig {
    /// Builds a configuration for the given credential pair and table.
    ///
    /// The output path defaults to `data/raw/<table>.csv`.
    pub fn new(endpoint: impl Into<String>, access_key: AccessKey, table: impl Into<String>) -> Self {
        let table = table.into();
        let output = default_output_path(&table);
        Self {
            endpoint: endpoint.into(),
            access_key,
            table,
            fetch: FetchOptions::default(),
            output,
        }
    }

    /// Builder method to override the fetch options.
    pub fn with_fetch(mut self, fetch: FetchOptions) -> Self {
        self.fetch = fetch;
        self
    }

    /// Builder method to override the output path.
    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.output = output;
        self
    }

    /// Validates the configuration before any remote operation.
    ///
    /// # Errors
    /// Returns `Configuration` if either credential is missing/empty or the
    /// batch size is zero. Validation runs before any network call.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(TabledumpError::configuration(
                "SOURCE_ENDPOINT not found in environment",
            ));
        }
        if self.access_key.is_empty() {
            return Err(TabledumpError::configuration(
                "SOURCE_ACCESS_KEY not found in environment",
            ));
        }
        if self.table.trim().is_empty() {
            return Err(TabledumpError::configuration("table name must not be empty"));
        }
        if self.fetch.batch_size == 0 {
            return Err(TabledumpError::configuration(
                "batch size must be a positive integer",
            ));
        }
        Ok(())
    }
}

/// Default artifact location for a table snapshot.
pub fn default_output_path(table: &str) -> PathBuf {
    PathBuf::from("data").join("raw").join(format!("{}.csv", table))
}
