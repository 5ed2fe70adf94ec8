//! Error types with credential sanitization.
//!
//! All error types in this module ensure that the service access key is never
//! exposed in error messages, logs, or any output format.

use thiserror::Error;

/// Main error type for tabledump operations.
///
/// # Security
/// All error messages are sanitized to prevent credential leakage.
/// The service access key is never included in error output.
#[derive(Debug, Error)]
pub enum TabledumpError {
    /// Configuration or validation error (missing credential, bad batch size)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A page request failed (network, auth, malformed query)
    #[error("Fetch failed: {context}")]
    Fetch {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The remote endpoint rejected a request with a structured error
    #[error("Fetch failed: {context}")]
    Remote { context: String },

    /// I/O operation failed (directory creation, file write)
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV serialization failed
    #[error("CSV serialization failed: {context}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },
}

/// Convenience type alias for Results with TabledumpError
pub type Result<T> = std::result::Result<T, TabledumpError>;

impl TabledumpError {
    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a fetch error with context, wrapping the underlying transport error
    pub fn fetch_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fetch {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a fetch error for a structured remote rejection (no source error)
    pub fn remote_rejected(context: impl Into<String>) -> Self {
        Self::Remote {
            context: context.into(),
        }
    }

    /// Creates an I/O error with context
    pub fn io_failed(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a CSV serialization error with context
    pub fn csv_failed(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            context: context.into(),
            source,
        }
    }
}

/// Masks any occurrence of the access key in a message.
///
/// Remote error bodies are echoed into fetch errors verbatim; if the endpoint
/// ever reflects the key back (e.g. in an auth failure), it must not reach
/// logs or stderr.
///
/// # Example
///
/// ```rust
/// use tabledump_core::error::redact_access_key;
///
/// let masked = redact_access_key("invalid key: sk-12345", "sk-12345");
/// assert_eq!(masked, "invalid key: ****");
/// ```
pub fn redact_access_key(message: &str, access_key: &str) -> String {
    if access_key.is_empty() {
        return message.to_string();
    }
    message.replace(access_key, "****")
}
