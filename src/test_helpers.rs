//! Shared test doubles for collector and dispatcher tests

use crate::error::{Error, Result};
use crate::reporter::{ExportEvent, Reporter};
use crate::salesforce::{QueryPage, RemoteStore};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// In-memory remote store serving a scripted sequence of query pages
pub(crate) struct FakeRemote {
    pages: Mutex<VecDeque<QueryPage>>,
    queries: Mutex<Vec<String>>,
    fail_query: bool,
}

impl FakeRemote {
    pub(crate) fn with_pages(pages: Vec<QueryPage>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            queries: Mutex::new(Vec::new()),
            fail_query: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            pages: Mutex::new(VecDeque::new()),
            queries: Mutex::new(Vec::new()),
            fail_query: true,
        }
    }

    /// SOQL strings passed to `query`, in call order
    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    fn next_page(&self) -> Result<QueryPage> {
        self.pages
            .lock()
            .map_err(|e| Error::Other(format!("fake remote poisoned: {e}")))?
            .pop_front()
            .ok_or_else(|| Error::Query("fake remote ran out of pages".to_string()))
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn query(&self, soql: &str) -> Result<QueryPage> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(soql.to_string());
        }
        if self.fail_query {
            return Err(Error::Query("INVALID_TYPE: sObject type not supported".to_string()));
        }
        self.next_page()
    }

    async fn query_more(&self, _locator: &str) -> Result<QueryPage> {
        self.next_page()
    }

    fn attachment_body_url(&self, id: &str) -> String {
        format!("https://fake.example.com/services/data/v57.0/sobjects/Attachment/{id}/body")
    }

    async fn fetch_attachment_body(&self, id: &str) -> Result<Vec<u8>> {
        Err(Error::FetchStatus {
            url: self.attachment_body_url(id),
            status: 404,
        })
    }
}

/// Reporter that records every event for later assertions
#[derive(Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<ExportEvent>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<ExportEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl Reporter for RecordingReporter {
    fn on_event(&self, event: &ExportEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
