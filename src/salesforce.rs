//! Salesforce remote-store client
//!
//! Three capabilities, matching what the export pipeline consumes:
//! - SOAP username/password/token login yielding the instance host and
//!   session id
//! - paginated SOQL queries over the REST `query` endpoint, followed page by
//!   page through the `nextRecordsUrl` locator
//! - per-record attachment body fetch
//!
//! The query/fetch surface is behind the [`RemoteStore`] trait so the
//! collector and dispatcher can be driven by any implementation; the shipped
//! one is [`RestClient`].

use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use url::Url;

/// REST/SOAP API version every endpoint is addressed with
pub const API_VERSION: &str = "57.0";

/// One page of query results plus the locator for the next page, if any
#[derive(Clone, Debug, Default)]
pub struct QueryPage {
    /// Loosely-typed result rows; validated into record types by callers
    pub records: Vec<serde_json::Value>,
    /// Locator path for the next page; `None` on the final page
    pub next_records_url: Option<String>,
}

/// Query and fetch capabilities of the remote store
///
/// A query is a finite, non-restartable sequence of pages: callers follow
/// each page's locator until it runs out. Consuming the "same" query twice
/// means issuing two independent remote queries.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Execute a SOQL query, returning the first page of results
    async fn query(&self, soql: &str) -> Result<QueryPage>;

    /// Follow a pagination locator returned by a previous page
    async fn query_more(&self, locator: &str) -> Result<QueryPage>;

    /// The URL a given attachment's body is fetched from
    fn attachment_body_url(&self, id: &str) -> String;

    /// Fetch one attachment's binary body.
    ///
    /// A non-2xx status is [`Error::FetchStatus`]; transport failures are
    /// [`Error::Network`]. Callers decide whether either aborts anything.
    async fn fetch_attachment_body(&self, id: &str) -> Result<Vec<u8>>;
}

/// Run a query to completion, materializing every page into one record list
pub async fn query_all(remote: &dyn RemoteStore, soql: &str) -> Result<Vec<serde_json::Value>> {
    let mut page = remote.query(soql).await?;
    let mut records = page.records;
    while let Some(locator) = page.next_records_url {
        page = remote.query_more(&locator).await?;
        records.append(&mut page.records);
    }
    Ok(records)
}

/// Wire shape of the REST query endpoint's response
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    records: Vec<serde_json::Value>,
    #[serde(rename = "nextRecordsUrl")]
    next_records_url: Option<String>,
}

/// HTTP client bound to one authenticated Salesforce session
#[derive(Clone, Debug)]
pub struct RestClient {
    http: reqwest::Client,
    instance_url: Url,
    session_id: String,
}

impl RestClient {
    /// Build a client from an already-established session.
    ///
    /// `instance_url` is the org's instance origin, e.g.
    /// `https://na139.salesforce.com`.
    pub fn new(instance_url: &str, session_id: impl Into<String>) -> Result<Self> {
        let instance_url = Url::parse(instance_url)?.join("/")?;
        Ok(Self {
            http: reqwest::Client::new(),
            instance_url,
            session_id: session_id.into(),
        })
    }

    /// Log in with username + password + security token via the SOAP login
    /// endpoint, selecting the production or sandbox login host from config.
    pub async fn login(config: &Config) -> Result<Self> {
        let host = if config.connect_to_sandbox {
            "https://test.salesforce.com"
        } else {
            "https://login.salesforce.com"
        };
        Self::login_at(host, config).await
    }

    /// Log in against an explicit login host (tests point this at a mock)
    pub async fn login_at(host: &str, config: &Config) -> Result<Self> {
        let envelope = login_envelope(
            &config.username,
            &format!("{}{}", config.password, config.security_token),
        );

        let http = reqwest::Client::new();
        let response = http
            .post(format!("{host}/services/Soap/u/{API_VERSION}"))
            .header("Content-Type", "text/xml; charset=UTF-8")
            .header("SOAPAction", "login")
            .body(envelope)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = tag_text(&body, "faultstring")?
                .unwrap_or_else(|| format!("login endpoint returned HTTP {status}"));
            return Err(Error::Auth(detail));
        }

        let session_id = tag_text(&body, "sessionId")?
            .ok_or_else(|| Error::Auth("login response carried no sessionId".to_string()))?;
        let server_url = tag_text(&body, "serverUrl")?
            .ok_or_else(|| Error::Auth("login response carried no serverUrl".to_string()))?;

        // serverUrl points at the SOAP endpoint on the instance; only the
        // origin is kept, every REST path is built from it
        let instance_url = Url::parse(&server_url)?.join("/")?;
        tracing::debug!(instance = %instance_url, "connected successfully");

        Ok(Self {
            http,
            instance_url,
            session_id,
        })
    }

    /// The instance origin this session is bound to
    pub fn instance_url(&self) -> &Url {
        &self.instance_url
    }

    /// Parse a query endpoint response, mapping non-2xx statuses to
    /// [`Error::Query`] with the response body as context
    async fn parse_query_response(response: reqwest::Response) -> Result<QueryPage> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Query(format!("HTTP {status}: {body}")));
        }
        let payload: QueryResponse = response.json().await?;
        Ok(QueryPage {
            records: payload.records,
            next_records_url: payload.next_records_url,
        })
    }
}

#[async_trait]
impl RemoteStore for RestClient {
    async fn query(&self, soql: &str) -> Result<QueryPage> {
        let url = self
            .instance_url
            .join(&format!("/services/data/v{API_VERSION}/query/"))?;
        let response = self
            .http
            .get(url)
            .query(&[("q", soql)])
            .header("Authorization", format!("Bearer {}", self.session_id))
            .send()
            .await?;
        Self::parse_query_response(response).await
    }

    async fn query_more(&self, locator: &str) -> Result<QueryPage> {
        let url = self.instance_url.join(locator)?;
        let response = self
            .http
            .get(url)
            .header("Authorization", format!("Bearer {}", self.session_id))
            .send()
            .await?;
        Self::parse_query_response(response).await
    }

    fn attachment_body_url(&self, id: &str) -> String {
        format!(
            "{}services/data/v{API_VERSION}/sobjects/Attachment/{id}/body",
            self.instance_url
        )
    }

    async fn fetch_attachment_body(&self, id: &str) -> Result<Vec<u8>> {
        let url = self.attachment_body_url(id);
        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("OAuth {}", self.session_id))
            .header("Content-Type", "application/octet-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchStatus {
                url,
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Render the SOAP login request body
fn login_envelope(username: &str, password: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<env:Envelope xmlns:env="http://schemas.xmlsoap.org/soap/envelope/" xmlns:urn="urn:partner.soap.sforce.com">
  <env:Body>
    <urn:login>
      <urn:username>{}</urn:username>
      <urn:password>{}</urn:password>
    </urn:login>
  </env:Body>
</env:Envelope>"#,
        xml_escape(username),
        xml_escape(password)
    )
}

/// Escape the five XML-reserved characters in a text node
fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Extract the text content of the first `<tag>...</tag>` element, ignoring
/// any namespace prefix on the tag name
fn tag_text(body: &str, tag: &str) -> Result<Option<String>> {
    let pattern = Regex::new(&format!("<(?:[A-Za-z0-9]+:)?{tag}>([^<]*)</(?:[A-Za-z0-9]+:)?{tag}>"))
        .map_err(|e| Error::Other(format!("invalid tag pattern for {tag}: {e}")))?;
    Ok(pattern
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string()))
}
