//! Record id collection — the discovery pass
//!
//! Runs the parent-filtered discovery query to completion, writes the
//! manifest for the item type, and returns every discovered id in discovery
//! order. This is the single-threaded half of a run: the manifest file is
//! only ever touched here, never during dispatch.

use crate::error::Result;
use crate::manifest::ManifestWriter;
use crate::reporter::{ExportEvent, Reporter};
use crate::salesforce::{query_all, RemoteStore};
use crate::types::{ItemType, LinkedRecord};
use std::collections::HashSet;
use std::path::Path;

/// Discover every linked item matching the discovery query.
///
/// Materializes all result pages, creates the output directory if absent,
/// writes the manifest header plus one row per record, and returns the
/// unique record ids in discovery order (downstream batches preserve that
/// order). Any query error propagates and aborts the item type; manifest
/// content written up to that point stays on disk.
pub async fn collect_record_ids(
    remote: &dyn RemoteStore,
    item: ItemType,
    soql: &str,
    output_dir: &Path,
    share_type: &str,
    visibility: &str,
    reporter: &dyn Reporter,
) -> Result<Vec<String>> {
    reporter.on_event(&ExportEvent::CollectionStarted { item });

    let rows = query_all(remote, soql).await?;
    tracing::debug!(item = item.label(), rows = rows.len(), "discovery query complete");

    let mut manifest = ManifestWriter::create(output_dir, item, share_type, visibility)?;
    let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
    let mut record_ids: Vec<String> = Vec::with_capacity(rows.len());

    for row in &rows {
        let record = LinkedRecord::from_row(item, row)?;
        manifest.append(&record)?;
        if seen.insert(record.id().to_string()) {
            record_ids.push(record.id().to_string());
        }
    }
    manifest.finish()?;

    reporter.on_event(&ExportEvent::RecordsDiscovered {
        item,
        count: record_ids.len(),
    });
    Ok(record_ids)
}
