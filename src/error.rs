//! Error types for sfdc-export
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error variants (authentication, query, batch planning)
//! - Field validation errors raised at the query-result boundary
//! - Automatic conversions from I/O, HTTP, CSV, and serialization errors
//!
//! Per-record attachment fetch failures are deliberately NOT part of this
//! taxonomy: they are isolated inside the download worker pool and surface as
//! logged outcome strings, never as run-aborting errors.

use thiserror::Error;

/// Result type alias for sfdc-export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sfdc-export
///
/// Every variant aborts the current item type's processing when it reaches
/// the exporter. Variants carry enough context to diagnose the failure from
/// a log line alone.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "batch_size")
        key: Option<String>,
    },

    /// Salesforce login failed (bad credentials, expired token, SOAP fault)
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A discovery or batch-detail query was rejected by the remote store
    #[error("query failed: {0}")]
    Query(String),

    /// A query result row is missing a field the record type requires
    #[error("missing field {field} in {object} query result")]
    MissingField {
        /// The sObject the row came from ("Attachment" or "Note")
        object: &'static str,
        /// The field that was absent or not a string
        field: &'static str,
    },

    /// Batch size of zero handed to the batch planner
    #[error("batch size must be a positive integer")]
    InvalidBatchSize,

    /// Attachment body fetch returned a non-success HTTP status
    ///
    /// Raised by the client layer; the dispatcher converts it into a logged
    /// per-record failure string rather than letting it abort the batch.
    #[error("fetch failed with HTTP {status} for {url}")]
    FetchStatus {
        /// The body fetch URL that was requested
        url: String,
        /// The HTTP status code the server answered with
        status: u16,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Manifest write error
    #[error("manifest error: {0}")]
    Manifest(#[from] csv::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL construction error
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Other error
    #[error("{0}")]
    Other(String),
}
