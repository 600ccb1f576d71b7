//! Run-level orchestration
//!
//! One [`Exporter`] drives up to two passes (attachments, then notes), each
//! following the same state machine: collect ids → no ids: done | has ids:
//! plan batches → dispatch each batch → done. A query error anywhere aborts
//! the run; rerunning restarts from the beginning.

use crate::collector::collect_record_ids;
use crate::config::Config;
use crate::dispatcher::download_batches;
use crate::error::Result;
use crate::reporter::{LogReporter, Reporter};
use crate::salesforce::RemoteStore;
use crate::types::ItemType;
use std::sync::Arc;

/// Ties collector, batch planner, and dispatcher together for a full run
pub struct Exporter {
    remote: Arc<dyn RemoteStore>,
    config: Arc<Config>,
    reporter: Arc<dyn Reporter>,
}

impl Exporter {
    /// Build an exporter that reports progress through tracing log lines
    pub fn new(remote: Arc<dyn RemoteStore>, config: Arc<Config>) -> Self {
        Self::with_reporter(remote, config, Arc::new(LogReporter))
    }

    /// Build an exporter with an injected progress observer
    pub fn with_reporter(
        remote: Arc<dyn RemoteStore>,
        config: Arc<Config>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            remote,
            config,
            reporter,
        }
    }

    /// Run every enabled export pass.
    ///
    /// `parent_filter` is the SOQL predicate yielding parent record ids; it
    /// scopes both the attachment and the note discovery queries.
    pub async fn run(&self, parent_filter: &str) -> Result<()> {
        if self.config.download_attachments {
            self.export_item(ItemType::Attachment, parent_filter).await?;
        }
        if self.config.download_notes {
            self.export_item(ItemType::Note, parent_filter).await?;
        }
        Ok(())
    }

    /// Export one item type end to end
    async fn export_item(&self, item: ItemType, parent_filter: &str) -> Result<()> {
        let soql = item.discovery_soql(parent_filter);
        let record_ids = collect_record_ids(
            self.remote.as_ref(),
            item,
            &soql,
            &self.config.output_dir,
            &self.config.sharetype,
            &self.config.visibility,
            self.reporter.as_ref(),
        )
        .await?;
        tracing::info!(item = item.label(), total = record_ids.len(), "found records");

        if record_ids.is_empty() {
            return Ok(());
        }

        download_batches(
            Arc::clone(&self.remote),
            item,
            &record_ids,
            &self.config.output_dir,
            self.config.batch_size,
            self.reporter.as_ref(),
        )
        .await
    }
}
