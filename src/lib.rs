//! # sfdc-export
//!
//! Bulk export of Salesforce Notes & Attachments with CSV manifest
//! generation.
//!
//! The pipeline has two sequential phases per item type:
//! 1. **Discovery** — a paginated, parent-filtered SOQL query materializes
//!    every linked record, writes the manifest, and yields the id list.
//! 2. **Dispatch** — the ids are partitioned into bounded batches; each batch
//!    is re-queried for the detail field set, then attachment bodies are
//!    fetched concurrently while note bodies are written sequentially from
//!    the inline query result.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sfdc_export::{Config, Exporter, RestClient};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config {
//!         username: "user@example.com".to_string(),
//!         password: "hunter2".to_string(),
//!         security_token: "token".to_string(),
//!         ..Default::default()
//!     });
//!
//!     let client = RestClient::login(&config).await?;
//!     let exporter = Exporter::new(Arc::new(client), config);
//!     exporter.run("SELECT Id FROM Account WHERE Industry = 'Banking'").await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Batch planning for detail queries
pub mod batch;
/// Record id collection (discovery pass)
pub mod collector;
/// Configuration types
pub mod config;
/// Download dispatch (batch retrieval pass)
pub mod dispatcher;
/// Error types
pub mod error;
/// Run-level orchestration
pub mod export;
/// Filename construction
pub mod filename;
/// CSV manifest output
pub mod manifest;
/// Progress reporting seam
pub mod reporter;
/// Salesforce remote-store client
pub mod salesforce;
/// Core record types and the query-result boundary
pub mod types;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use batch::split_into_batches;
pub use collector::collect_record_ids;
pub use config::Config;
pub use dispatcher::download_batches;
pub use error::{Error, Result};
pub use export::Exporter;
pub use filename::build_filename;
pub use manifest::ManifestWriter;
pub use reporter::{ExportEvent, LogReporter, Reporter};
pub use salesforce::{query_all, QueryPage, RemoteStore, RestClient, API_VERSION};
pub use types::{AttachmentRecord, DownloadRecord, ItemType, LinkedRecord, NoteRecord};
