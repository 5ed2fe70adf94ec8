//! Remote table client for PostgREST-style query APIs.
//!
//! This module defines the narrow client surface the export engine depends
//! on: windowed row selection and a zero-row existence probe. The REST
//! implementation speaks the PostgREST dialect used by hosted Postgres
//! services (range pagination via `Range` headers, exact counts via
//! `Prefer: count=exact`).
//!
//! # Security
//! - The access key travels only in request headers
//! - Remote error bodies are redacted before they reach error messages
//! - Transport retries and timeouts are left to the HTTP client defaults

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, RANGE};
use serde::Deserialize;
use url::Url;

use crate::config::AccessKey;
use crate::error::{Result, TabledumpError, redact_access_key};

/// One record as returned by the remote source: an ordered mapping from
/// column name to scalar or null value. The schema is whatever the source
/// returns; key order is preserved as received.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// One bounded-size batch of rows returned by a single windowed request.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Rows in source order
    pub rows: Vec<Row>,
}

impl Page {
    /// Number of rows in this page.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the page carries no rows (source exhausted).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Structured result of the connectivity probe.
///
/// A missing relation still counts as a healthy connection: credentials and
/// transport are valid, only the schema is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The probe query succeeded; carries the server-side row count if the
    /// endpoint reported one
    Reachable { total: Option<u64> },
    /// The endpoint answered but the target table does not exist yet
    MissingTable { message: String },
    /// Any other failure (transport, auth, malformed response)
    Failed { message: String },
}

impl ProbeOutcome {
    /// Whether the probe demonstrates a working connection.
    pub fn connection_ok(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Narrow client surface for a remote tabular collection.
///
/// Object-safe so the fetch loop and tests can work against
/// `&dyn TableClient`. Client construction, authentication headers, and
/// transport behavior are the implementation's responsibility.
#[async_trait]
pub trait TableClient: Send + Sync {
    /// Requests all columns of `table` for the inclusive row window
    /// `[range.0, range.1]`, unfiltered and in source order.
    ///
    /// # Errors
    /// Returns `Fetch`/`Remote` on any transport or query failure. A window
    /// beyond the end of the table is not an error; it yields an empty page.
    async fn select(&self, table: &str, range: (u64, u64)) -> Result<Page>;

    /// Issues the cheapest possible existence probe: a query requesting zero
    /// rows but an exact count. Never returns an error; failures are folded
    /// into the outcome classification.
    async fn probe(&self, table: &str) -> ProbeOutcome;
}

/// Error body shape returned by PostgREST endpoints.
#[derive(Debug, Deserialize)]
struct WireApiError {
    message: Option<String>,
    code: Option<String>,
}

/// Postgres "undefined table" SQLSTATE, surfaced by PostgREST as `code`.
const UNDEFINED_TABLE_CODE: &str = "42P01";

/// REST implementation of [`TableClient`] for PostgREST-style endpoints.
///
/// # Example
///
/// ```rust,no_run
/// use tabledump_core::client::RestTableClient;
/// use tabledump_core::config::AccessKey;
///
/// let client = RestTableClient::new(
///     "https://project.supabase.co",
///     AccessKey::new("service-role-key"),
/// ).expect("valid endpoint URL");
/// ```
#[derive(Debug, Clone)]
pub struct RestTableClient {
    http: reqwest::Client,
    base: Url,
    access_key: AccessKey,
}

impl RestTableClient {
    /// Creates a client for the given endpoint and access key.
    ///
    /// # Errors
    /// Returns `Configuration` if the endpoint is not a valid URL.
    pub fn new(endpoint: &str, access_key: AccessKey) -> Result<Self> {
        let base = Url::parse(endpoint).map_err(|e| {
            TabledumpError::configuration(format!("invalid SOURCE_ENDPOINT: {}", e))
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            access_key,
        })
    }

    /// Builds the query URL for a table: `{endpoint}/rest/v1/{table}?select=*`.
    fn table_url(&self, table: &str) -> Result<Url> {
        let mut url = self
            .base
            .join(&format!("rest/v1/{}", table))
            .map_err(|e| {
                TabledumpError::configuration(format!(
                    "cannot build query URL for table '{}': {}",
                    table, e
                ))
            })?;
        url.query_pairs_mut().append_pair("select", "*");
        Ok(url)
    }

    /// Applies the authentication headers every request carries.
    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", self.access_key.reveal())
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.access_key.reveal()),
            )
    }

    /// Reads an error response body and maps it to a sanitized message.
    async fn remote_error_message(&self, response: reqwest::Response, status: StatusCode) -> String {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("unable to read error body"));

        let detail = match serde_json::from_str::<WireApiError>(&body) {
            Ok(wire) => {
                let message = wire.message.unwrap_or_else(|| body.clone());
                match wire.code {
                    Some(code) => format!("[{}] {}", code, message),
                    None => message,
                }
            }
            Err(_) => body,
        };

        redact_access_key(
            &format!("HTTP {}: {}", status.as_u16(), detail),
            self.access_key.reveal(),
        )
    }
}

#[async_trait]
impl TableClient for RestTableClient {
    async fn select(&self, table: &str, range: (u64, u64)) -> Result<Page> {
        let (from, to) = range;
        let url = self.table_url(table)?;
        let context = format!("requesting window [{}, {}] of table '{}'", from, to, table);

        let response = self
            .authed(self.http.get(url))
            .header("Range-Unit", "items")
            .header(RANGE, format!("{}-{}", from, to))
            .send()
            .await
            .map_err(|e| TabledumpError::fetch_failed(context.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            let message = self.remote_error_message(response, status).await;
            return Err(TabledumpError::remote_rejected(format!(
                "{}: {}",
                context, message
            )));
        }

        let rows: Vec<Row> = response
            .json()
            .await
            .map_err(|e| TabledumpError::fetch_failed(context, e))?;

        Ok(Page { rows })
    }

    async fn probe(&self, table: &str) -> ProbeOutcome {
        let mut url = match self.table_url(table) {
            Ok(url) => url,
            Err(e) => {
                return ProbeOutcome::Failed {
                    message: e.to_string(),
                };
            }
        };
        url.query_pairs_mut().append_pair("limit", "0");

        let response = self
            .authed(self.http.get(url))
            .header("Prefer", "count=exact")
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                return ProbeOutcome::Failed {
                    message: redact_access_key(&e.to_string(), self.access_key.reveal()),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            let total = content_range_total(&response);
            return ProbeOutcome::Reachable { total };
        }

        let message = self.remote_error_message(response, status).await;
        if is_missing_table(&message) {
            ProbeOutcome::MissingTable { message }
        } else {
            ProbeOutcome::Failed { message }
        }
    }
}

/// Extracts the total row count from a `Content-Range: */N` response header.
fn content_range_total(response: &reqwest::Response) -> Option<u64> {
    let value = response.headers().get("content-range")?.to_str().ok()?;
    let (_, total) = value.rsplit_once('/')?;
    total.parse().ok()
}

/// Classifies a remote error message as "table absent".
///
/// Checks the PostgREST error code first, then falls back to the substring
/// match on the Postgres error text for endpoints that return no code.
fn is_missing_table(message: &str) -> bool {
    if message.contains(UNDEFINED_TABLE_CODE) {
        return true;
    }
    let lower = message.to_lowercase();
    lower.contains("relation") || lower.contains("does not exist")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(endpoint: &str) -> RestTableClient {
        RestTableClient::new(endpoint, AccessKey::new("test-key")).unwrap()
    }

    fn mock_rows(count: usize, start_id: usize) -> Vec<serde_json::Value> {
        (start_id..start_id + count)
            .map(|i| {
                serde_json::json!({
                    "id": i,
                    "address": format!("{} Main St", i)
                })
            })
            .collect()
    }

    #[tokio::test]
    async fn test_select_sends_window_headers() {
        let server = MockServer::start().await;
        let client = test_client(&server.uri());

        Mock::given(method("GET"))
            .and(path("/rest/v1/properties"))
            .and(query_param("select", "*"))
            .and(header("Range", "0-999"))
            .and(header("Range-Unit", "items"))
            .and(header("apikey", "test-key"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(mock_rows(3, 1)))
            .expect(1)
            .mount(&server)
            .await;

        let page = client.select("properties", (0, 999)).await.unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page.rows[0].get("id"), Some(&serde_json::json!(1)));
    }

    #[tokio::test]
    async fn test_select_window_past_end_yields_empty_page() {
        let server = MockServer::start().await;
        let client = test_client(&server.uri());

        Mock::given(method("GET"))
            .and(path("/rest/v1/properties"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([])),
            )
            .mount(&server)
            .await;

        let page = client.select("properties", (5000, 5999)).await.unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_select_maps_remote_error_body() {
        let server = MockServer::start().await;
        let client = test_client(&server.uri());

        let body = serde_json::json!({
            "message": "permission denied for table properties",
            "code": "42501"
        });
        Mock::given(method("GET"))
            .and(path("/rest/v1/properties"))
            .respond_with(ResponseTemplate::new(403).set_body_json(&body))
            .mount(&server)
            .await;

        let err = client.select("properties", (0, 999)).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("403"), "missing status: {}", message);
        assert!(message.contains("42501"), "missing code: {}", message);
        assert!(message.contains("window [0, 999]"), "missing window: {}", message);
    }

    #[tokio::test]
    async fn test_select_error_redacts_access_key() {
        let server = MockServer::start().await;
        let client = test_client(&server.uri());

        // An endpoint that echoes the key back must not leak it
        Mock::given(method("GET"))
            .and(path("/rest/v1/properties"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string("bad key: test-key"),
            )
            .mount(&server)
            .await;

        let err = client.select("properties", (0, 999)).await.unwrap_err();
        let message = err.to_string();
        assert!(!message.contains("test-key"), "leaked key: {}", message);
        assert!(message.contains("****"));
    }

    #[tokio::test]
    async fn test_probe_reachable_with_exact_count() {
        let server = MockServer::start().await;
        let client = test_client(&server.uri());

        Mock::given(method("GET"))
            .and(path("/rest/v1/properties"))
            .and(query_param("limit", "0"))
            .and(header("Prefer", "count=exact"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Range", "*/1234")
                    .set_body_json(serde_json::json!([])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client.probe("properties").await;
        assert_eq!(outcome, ProbeOutcome::Reachable { total: Some(1234) });
        assert!(outcome.connection_ok());
    }

    #[tokio::test]
    async fn test_probe_missing_table_counts_as_reachable() {
        let server = MockServer::start().await;
        let client = test_client(&server.uri());

        let body = serde_json::json!({
            "message": "relation \"public.properties\" does not exist",
            "code": "42P01"
        });
        Mock::given(method("GET"))
            .and(path("/rest/v1/properties"))
            .respond_with(ResponseTemplate::new(404).set_body_json(&body))
            .mount(&server)
            .await;

        let outcome = client.probe("properties").await;
        assert!(matches!(outcome, ProbeOutcome::MissingTable { .. }));
        assert!(outcome.connection_ok());
    }

    #[tokio::test]
    async fn test_probe_other_error_is_not_ok() {
        let server = MockServer::start().await;
        let client = test_client(&server.uri());

        Mock::given(method("GET"))
            .and(path("/rest/v1/properties"))
            .respond_with(
                ResponseTemplate::new(500).set_body_string("internal error"),
            )
            .mount(&server)
            .await;

        let outcome = client.probe("properties").await;
        assert!(matches!(outcome, ProbeOutcome::Failed { .. }));
        assert!(!outcome.connection_ok());
    }

    #[tokio::test]
    async fn test_probe_unreachable_endpoint_fails() {
        // Port 1 is never listening
        let client = test_client("http://127.0.0.1:1");

        let outcome = client.probe("properties").await;
        assert!(matches!(outcome, ProbeOutcome::Failed { .. }));
    }

    #[test]
    fn test_missing_table_classification_fallback() {
        // Structured code
        assert!(is_missing_table("HTTP 404: [42P01] undefined table"));
        // Substring fallback, either half is enough
        assert!(is_missing_table("relation \"x\" is unknown"));
        assert!(is_missing_table("table does not exist"));
        // Unrelated failures stay failures
        assert!(!is_missing_table("HTTP 401: invalid signature"));
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let result = RestTableClient::new("not a url", AccessKey::new("k"));
        assert!(result.is_err());
    }
}
