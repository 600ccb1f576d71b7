//! Progress reporting seam
//!
//! Components never touch global progress state; they emit [`ExportEvent`]s
//! through an injected [`Reporter`]. The default [`LogReporter`] renders
//! events as tracing log lines at the levels an operator expects (batch
//! milestones at INFO, per-record outcomes at DEBUG). Tests inject a
//! recording reporter instead.

use crate::types::ItemType;

/// Progress milestones emitted during an export run
#[derive(Clone, Debug, PartialEq)]
pub enum ExportEvent {
    /// Discovery query for an item type is starting
    CollectionStarted {
        /// The item type being collected
        item: ItemType,
    },

    /// Discovery finished; manifest written, ids returned
    RecordsDiscovered {
        /// The item type that was collected
        item: ItemType,
        /// Number of unique records discovered
        count: usize,
    },

    /// A batch's detail query and dispatch is starting
    BatchStarted {
        /// 1-based batch index
        index: usize,
        /// Total number of batches in this run
        total: usize,
        /// Number of record ids in this batch
        size: usize,
    },

    /// Every worker in the batch has completed
    BatchCompleted {
        /// 1-based batch index
        index: usize,
        /// Total number of batches in this run
        total: usize,
    },

    /// One download worker finished; `message` is its outcome string
    FetchOutcome {
        /// Human-readable success/failure line, consumed for logging only
        message: String,
    },

    /// All batches for an item type are done
    RunCompleted {
        /// The item type that finished
        item: ItemType,
    },
}

/// Observer for export progress
///
/// Implementations must be cheap and non-blocking; they are called from the
/// single-threaded collection path and from the dispatch loop while worker
/// results drain.
pub trait Reporter: Send + Sync {
    /// Handle one progress event
    fn on_event(&self, event: &ExportEvent);
}

/// Default reporter: renders events as structured tracing log lines
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn on_event(&self, event: &ExportEvent) {
        match event {
            ExportEvent::CollectionStarted { item } => {
                tracing::info!(item = item.label(), "querying record ids");
            }
            ExportEvent::RecordsDiscovered { item, count } => {
                tracing::info!(item = item.label(), count, "records discovered");
            }
            ExportEvent::BatchStarted { index, total, size } => {
                tracing::info!(batch = index, total, size, "processing batch");
            }
            ExportEvent::BatchCompleted { index, total } => {
                tracing::info!(batch = index, total, "all files in batch downloaded");
            }
            ExportEvent::FetchOutcome { message } => {
                tracing::debug!("{message}");
            }
            ExportEvent::RunCompleted { item } => {
                tracing::info!(item = item.label(), "all batches complete");
            }
        }
    }
}
