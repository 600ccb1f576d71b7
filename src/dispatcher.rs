//! Download dispatch — the batch-by-batch retrieval pass
//!
//! Batches are processed strictly in order, one at a time. Each batch is
//! re-queried with the wider detail field set (a second round-trip, distinct
//! from discovery), then its records are dispatched: attachment bodies fan
//! out across a bounded worker pool, note bodies are written sequentially
//! from the inline query result.
//!
//! Failure isolation: a worker's fetch failure becomes an outcome string that
//! is drained and logged, never branched on — the batch keeps going and there
//! is no retry. Filesystem write failures are different: they abort the run,
//! but only after every worker in the flight has completed, so no task is
//! cancelled mid-write.

use crate::batch::split_into_batches;
use crate::error::{Error, Result};
use crate::reporter::{ExportEvent, Reporter};
use crate::salesforce::{query_all, RemoteStore};
use crate::types::{DownloadRecord, ItemType};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Convert the discovered identifier list into on-disk files, batch by batch.
///
/// Partitions `record_ids` per `batch_size`, issues one detail query per
/// batch (`<detail stem> WHERE Id IN ('..','..')`), and dispatches each
/// batch's records according to the item type. Query, validation, and
/// filesystem errors abort the run; per-record fetch failures do not.
pub async fn download_batches(
    remote: Arc<dyn RemoteStore>,
    item: ItemType,
    record_ids: &[String],
    output_dir: &Path,
    batch_size: usize,
    reporter: &dyn Reporter,
) -> Result<()> {
    let batches = split_into_batches(record_ids, batch_size)?;
    let total = batches.len();

    for (index, batch) in batches.iter().enumerate() {
        reporter.on_event(&ExportEvent::BatchStarted {
            index: index + 1,
            total,
            size: batch.len(),
        });

        let batch_soql = format!("{} WHERE Id IN ({})", item.detail_soql(), quoted_id_list(batch));
        let rows = query_all(remote.as_ref(), &batch_soql).await?;
        tracing::debug!(item = item.label(), batch = index + 1, results = rows.len(), "detail query found results");

        let records = rows
            .iter()
            .map(|row| DownloadRecord::from_row(item, row))
            .collect::<Result<Vec<_>>>()?;

        match item {
            ItemType::Attachment => {
                download_attachment_batch(&remote, records, output_dir, reporter).await?;
            }
            ItemType::Note => {
                write_note_batch(records, output_dir, reporter).await?;
            }
        }

        reporter.on_event(&ExportEvent::BatchCompleted {
            index: index + 1,
            total,
        });
    }

    reporter.on_event(&ExportEvent::RunCompleted { item });
    Ok(())
}

/// Render a batch as a quoted SOQL `IN` list: `'id1','id2',...`
fn quoted_id_list(batch: &[String]) -> String {
    batch
        .iter()
        .map(|id| format!("'{id}'"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Fan one batch's attachment fetches out across a bounded worker pool.
///
/// Pool width is the machine's available parallelism. Workers share nothing
/// mutable: each owns its record, its output path, and a cloned client
/// handle. The pool is always drained to completion; the first filesystem
/// error (if any) is surfaced only after the last worker finishes.
async fn download_attachment_batch(
    remote: &Arc<dyn RemoteStore>,
    records: Vec<DownloadRecord>,
    output_dir: &Path,
    reporter: &dyn Reporter,
) -> Result<()> {
    let pool_size = std::thread::available_parallelism().map_or(4, NonZeroUsize::get);
    let pool = Arc::new(Semaphore::new(pool_size));
    let mut workers: JoinSet<Result<String>> = JoinSet::new();

    for record in records {
        let permit = pool
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| Error::Other(format!("worker pool closed: {e}")))?;
        let remote = Arc::clone(remote);
        let output_dir = output_dir.to_path_buf();
        workers.spawn(async move {
            let _permit = permit;
            download_attachment(remote, record, output_dir).await
        });
    }

    let mut first_error: Option<Error> = None;
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok(Ok(message)) => reporter.on_event(&ExportEvent::FetchOutcome { message }),
            Ok(Err(e)) => {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(Error::Other(format!("download worker panicked: {e}")));
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Fetch one attachment's body and write it to disk.
///
/// Returns the outcome string the pool drains into the log. A fetch failure
/// (non-2xx or transport) is an `Ok` outcome naming the URL, with no file
/// written; only a filesystem write failure is an `Err`.
async fn download_attachment(
    remote: Arc<dyn RemoteStore>,
    record: DownloadRecord,
    output_dir: PathBuf,
) -> Result<String> {
    let url = remote.attachment_body_url(&record.id);
    tracing::debug!(record_id = %record.id, url = %url, "downloading attachment body");

    match remote.fetch_attachment_body(&record.id).await {
        Ok(bytes) => {
            let path = output_dir.join(record.filename());
            tokio::fs::write(&path, &bytes).await?;
            Ok(format!("Saved file to {}", path.display()))
        }
        Err(e) => Ok(format!("Couldn't download {url}: {e}")),
    }
}

/// Write one batch's note bodies sequentially.
///
/// Note content travels inline in the detail query, so there is no remote
/// fetch here. An absent body still produces the file, empty.
async fn write_note_batch(
    records: Vec<DownloadRecord>,
    output_dir: &Path,
    reporter: &dyn Reporter,
) -> Result<()> {
    let mut extracted = 0usize;
    for record in records {
        let path = output_dir.join(record.filename());
        let body = record.body.as_deref().unwrap_or("");
        tokio::fs::write(&path, body).await?;
        extracted += 1;

        let message = if body.is_empty() {
            format!("({extracted}): Empty body for {}", path.display())
        } else {
            format!("({extracted}): Saved note body to {}", path.display())
        };
        reporter.on_event(&ExportEvent::FetchOutcome { message });
    }
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::salesforce::{QueryPage, RestClient};
    use crate::test_helpers::{FakeRemote, RecordingReporter};
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param_contains};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn attachment_fetch_writes_body_to_sanitized_filename() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v57.0/query/"))
            .and(query_param_contains("q", "WHERE Id IN ('A1')"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "done": true,
                "records": [{"Id": "A1", "Name": "Invoice 1", "ParentId": "P1"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/services/data/v57.0/sobjects/Attachment/A1/body"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PDF-BYTES".to_vec()))
            .mount(&server)
            .await;

        let remote: Arc<dyn RemoteStore> = Arc::new(RestClient::new(&server.uri(), "sess").unwrap());
        let dir = TempDir::new().unwrap();
        let reporter = RecordingReporter::default();

        download_batches(
            remote,
            ItemType::Attachment,
            &ids(&["A1"]),
            dir.path(),
            100,
            &reporter,
        )
        .await
        .unwrap();

        let saved = std::fs::read(dir.path().join("Invoice1-ID-A1-ParentId-P1")).unwrap();
        assert_eq!(saved, b"PDF-BYTES");
    }

    #[tokio::test]
    async fn fetch_failure_is_isolated_and_logged_with_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/services/data/v57.0/query/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "done": true,
                "records": [
                    {"Id": "A1", "Name": "ok", "ParentId": "P1"},
                    {"Id": "A2", "Name": "gone", "ParentId": "P1"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/services/data/v57.0/sobjects/Attachment/A1/body"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"OK".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/services/data/v57.0/sobjects/Attachment/A2/body"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let remote: Arc<dyn RemoteStore> = Arc::new(RestClient::new(&server.uri(), "sess").unwrap());
        let dir = TempDir::new().unwrap();
        let reporter = RecordingReporter::default();

        download_batches(
            remote,
            ItemType::Attachment,
            &ids(&["A1", "A2"]),
            dir.path(),
            100,
            &reporter,
        )
        .await
        .unwrap();

        // the healthy record's file landed, the 404 record produced none
        assert!(dir.path().join("ok-ID-A1-ParentId-P1").exists());
        assert!(!dir.path().join("gone-ID-A2-ParentId-P1").exists());

        let outcomes: Vec<String> = reporter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ExportEvent::FetchOutcome { message } => Some(message),
                _ => None,
            })
            .collect();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().any(|m| m.starts_with("Saved file to")));
        assert!(outcomes
            .iter()
            .any(|m| m.starts_with("Couldn't download")
                && m.contains("/sobjects/Attachment/A2/body")));
    }

    #[tokio::test]
    async fn note_bodies_are_written_inline() {
        let remote = Arc::new(FakeRemote::with_pages(vec![QueryPage {
            records: vec![
                json!({"Id": "N1", "Title": "Memo", "ParentId": "P1", "Body": "Hello"}),
                json!({"Id": "N2", "Title": "Empty", "ParentId": "P1", "Body": null}),
            ],
            next_records_url: None,
        }]));
        let dir = TempDir::new().unwrap();

        download_batches(
            remote,
            ItemType::Note,
            &ids(&["N1", "N2"]),
            dir.path(),
            100,
            &RecordingReporter::default(),
        )
        .await
        .unwrap();

        let hello = std::fs::read_to_string(dir.path().join("Memo-ID-N1-ParentId-P1")).unwrap();
        assert_eq!(hello, "Hello");
        let empty = std::fs::read_to_string(dir.path().join("Empty-ID-N2-ParentId-P1")).unwrap();
        assert_eq!(empty, "");
    }

    #[tokio::test]
    async fn batches_issue_one_detail_query_each_in_order() {
        let page = |id: &str| QueryPage {
            records: vec![json!({"Id": id, "Title": "t", "ParentId": "P1", "Body": "x"})],
            next_records_url: None,
        };
        let remote = Arc::new(FakeRemote::with_pages(vec![
            page("N1"),
            page("N3"),
        ]));
        let dir = TempDir::new().unwrap();

        download_batches(
            Arc::clone(&remote) as Arc<dyn RemoteStore>,
            ItemType::Note,
            &ids(&["N1", "N2", "N3"]),
            dir.path(),
            2,
            &RecordingReporter::default(),
        )
        .await
        .unwrap();

        let queries = remote.queries();
        assert_eq!(queries.len(), 2);
        assert!(queries[0].ends_with("WHERE Id IN ('N1','N2')"));
        assert!(queries[1].ends_with("WHERE Id IN ('N3')"));
    }

    #[tokio::test]
    async fn zero_batch_size_aborts_before_any_query() {
        let remote = Arc::new(FakeRemote::with_pages(vec![]));
        let dir = TempDir::new().unwrap();

        let err = download_batches(
            Arc::clone(&remote) as Arc<dyn RemoteStore>,
            ItemType::Note,
            &ids(&["N1"]),
            dir.path(),
            0,
            &RecordingReporter::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::InvalidBatchSize));
        assert!(remote.queries().is_empty());
    }

    #[tokio::test]
    async fn detail_query_failure_aborts_the_run() {
        let remote = Arc::new(FakeRemote::failing());
        let dir = TempDir::new().unwrap();

        let err = download_batches(
            remote,
            ItemType::Note,
            &ids(&["N1"]),
            dir.path(),
            10,
            &RecordingReporter::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Query(_)));
    }
}
