//! Core export engine for tabledump.
//!
//! This crate provides the building blocks of the paginated bulk-export
//! pipeline and its connectivity preflight: run configuration, the remote
//! table client, the windowed fetch loop, the in-memory dataset, and the
//! CSV materializer.
//!
//! # Security Guarantees
//! - The service access key is never stored in output or logged
//! - All remote operations are read-only
//! - Error messages are sanitized before they reach any output
//!
//! # Architecture
//! The pipeline runs fetch, accumulate, and materialize in strict sequence
//! with exactly one request in flight at a time. The preflight verifier is
//! independent and shares no runtime state with the pipeline.

pub mod client;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod output;
pub mod preflight;

// Re-export commonly used types
pub use client::{Page, ProbeOutcome, RestTableClient, Row, TableClient};
pub use config::{AccessKey, ExportConfig, FetchOptions};
pub use dataset::Dataset;
pub use error::{Result, TabledumpError};
pub use fetch::fetch_all;
pub use logging::init_logging;
pub use output::write_csv;
pub use preflight::{VerifyReport, verify};
