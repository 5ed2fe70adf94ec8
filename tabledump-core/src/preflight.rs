//! Preflight credential and connectivity verification.
//!
//! Runs standalone, before any export is attempted: checks that both
//! credential values are present, then issues a zero-row existence probe
//! against the target table. A probe that fails only because the table does
//! not exist yet still counts as a working connection.

use tracing::{debug, info};

use crate::client::{ProbeOutcome, RestTableClient, TableClient};
use crate::config::AccessKey;

/// Findings of one preflight run. No state is persisted; the report is the
/// entire outcome.
#[derive(Debug, Clone)]
pub struct VerifyReport {
    /// `SOURCE_ENDPOINT` present and non-empty
    pub endpoint_set: bool,
    /// `SOURCE_ACCESS_KEY` present and non-empty
    pub access_key_set: bool,
    /// The probe demonstrated a working connection
    pub connection_ok: bool,
    /// Human-readable note on the probe outcome, if any
    pub detail: Option<String>,
}

impl VerifyReport {
    /// Both credential values are present.
    pub fn credentials_ok(&self) -> bool {
        self.endpoint_set && self.access_key_set
    }

    /// Every check passed.
    pub fn all_ok(&self) -> bool {
        self.credentials_ok() && self.connection_ok
    }
}

/// Checks credential presence without touching the network.
pub fn check_credentials(endpoint: Option<&str>, access_key: Option<&str>) -> VerifyReport {
    VerifyReport {
        endpoint_set: endpoint.is_some_and(|v| !v.trim().is_empty()),
        access_key_set: access_key.is_some_and(|v| !v.trim().is_empty()),
        connection_ok: false,
        detail: None,
    }
}

/// Probes the table and classifies the outcome.
///
/// Returns whether the connection is healthy plus an optional note. A
/// missing table is healthy; everything else that fails is not.
pub async fn verify_connection(
    client: &dyn TableClient,
    table: &str,
) -> (bool, Option<String>) {
    match client.probe(table).await {
        ProbeOutcome::Reachable { total } => {
            let detail = total.map(|t| format!("table '{}' reachable ({} rows)", table, t));
            (true, detail)
        }
        ProbeOutcome::MissingTable { message } => {
            debug!("Probe reported missing table: {}", message);
            (
                true,
                Some(format!("table '{}' does not exist yet", table)),
            )
        }
        ProbeOutcome::Failed { message } => (false, Some(message)),
    }
}

/// Full preflight: credential presence check, then connectivity probe.
///
/// The probe is skipped entirely when either credential is missing; no
/// network round trip happens in that case.
pub async fn verify(
    endpoint: Option<&str>,
    access_key: Option<&str>,
    table: &str,
) -> VerifyReport {
    let mut report = check_credentials(endpoint, access_key);
    if !report.credentials_ok() {
        return report;
    }

    info!("Testing connection...");

    // Both values are present past the credentials check
    let endpoint = endpoint.unwrap_or_default();
    let key = AccessKey::new(access_key.unwrap_or_default());

    let client = match RestTableClient::new(endpoint, key) {
        Ok(client) => client,
        Err(e) => {
            report.detail = Some(e.to_string());
            return report;
        }
    };

    let (connection_ok, detail) = verify_connection(&client, table).await;
    report.connection_ok = connection_ok;
    report.detail = detail;
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::client::Page;
    use crate::error::Result;
    use async_trait::async_trait;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StubClient {
        outcome: ProbeOutcome,
    }

    #[async_trait]
    impl TableClient for StubClient {
        async fn select(&self, _table: &str, _range: (u64, u64)) -> Result<Page> {
            Ok(Page::default())
        }

        async fn probe(&self, _table: &str) -> ProbeOutcome {
            self.outcome.clone()
        }
    }

    #[test]
    fn test_check_credentials_reports_each_missing_value() {
        let report = check_credentials(Some("https://x.example"), None);
        assert!(report.endpoint_set);
        assert!(!report.access_key_set);
        assert!(!report.credentials_ok());

        let report = check_credentials(None, Some("key"));
        assert!(!report.endpoint_set);
        assert!(report.access_key_set);

        let report = check_credentials(Some(""), Some("   "));
        assert!(!report.endpoint_set);
        assert!(!report.access_key_set);
    }

    #[tokio::test]
    async fn test_missing_key_skips_probe() {
        // An endpoint that cannot be reached would fail the probe; the
        // report must come back before any connection attempt
        let report = verify(Some("http://127.0.0.1:1"), None, "properties").await;

        assert!(!report.credentials_ok());
        assert!(!report.connection_ok);
        assert!(report.detail.is_none());
    }

    #[tokio::test]
    async fn test_missing_table_still_counts_as_connected() {
        let client = StubClient {
            outcome: ProbeOutcome::MissingTable {
                message: "relation \"public.properties\" does not exist".to_string(),
            },
        };

        let (ok, detail) = verify_connection(&client, "properties").await;

        assert!(ok);
        assert!(detail.unwrap().contains("does not exist yet"));
    }

    #[tokio::test]
    async fn test_probe_failure_surfaces_message() {
        let client = StubClient {
            outcome: ProbeOutcome::Failed {
                message: "HTTP 401: invalid signature".to_string(),
            },
        };

        let (ok, detail) = verify_connection(&client, "properties").await;

        assert!(!ok);
        assert_eq!(detail.unwrap(), "HTTP 401: invalid signature");
    }

    #[tokio::test]
    async fn test_full_verify_against_live_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/properties"))
            .and(query_param("limit", "0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Range", "*/42")
                    .set_body_json(serde_json::json!([])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let report = verify(Some(&server.uri()), Some("test-key"), "properties").await;

        assert!(report.all_ok());
        assert!(report.detail.unwrap().contains("42 rows"));
    }
}
