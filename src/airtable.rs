//! Airtable REST client for the project table.
//!
//! One GET per result page against the Airtable list endpoint, following
//! the `offset` continuation token until the table is exhausted. Each page
//! request is a single retryable unit under the `[airtable]` retry policy.

use crate::config::AirtableConfig;
use crate::digest::ProjectRecord;
use crate::error::{DigestError, Result};
use crate::retry::RetryPolicy;
use serde::Deserialize;
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://api.airtable.com/v0";

/// Client for the Airtable list-records endpoint.
pub struct AirtableClient {
    config: AirtableConfig,
    retry: RetryPolicy,
    http: reqwest::Client,
    base_url: String,
}

/// One page of the list-records response.
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    records: Vec<RecordEnvelope>,
    /// Continuation token; absent on the last page.
    offset: Option<String>,
}

/// Airtable wraps each row's cells in a `fields` object.
#[derive(Debug, Deserialize)]
struct RecordEnvelope {
    #[serde(default)]
    fields: ProjectRecord,
}

impl AirtableClient {
    /// Create a client for the configured base and table.
    pub fn new(config: AirtableConfig) -> Self {
        let retry = config.retry_policy();
        Self {
            config,
            retry,
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Override the API base URL (useful for testing with mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch every record of the table, in table order.
    ///
    /// The run owns the returned set; nothing is cached across runs.
    pub async fn fetch_records(&self) -> Result<Vec<ProjectRecord>> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let page = self
                .retry
                .run("airtable fetch", || self.fetch_page(offset.clone()))
                .await?;
            records.extend(page.records.into_iter().map(|r| r.fields));
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        info!(
            "fetched {} records from table '{}'",
            records.len(),
            self.config.table_name
        );
        Ok(records)
    }

    async fn fetch_page(&self, offset: Option<String>) -> Result<ListResponse> {
        let url = format!(
            "{}/{}/{}",
            self.base_url, self.config.base_id, self.config.table_name
        );
        debug!("GET {url} (offset: {offset:?})");

        let mut request = self.http.get(&url).bearer_auth(&self.config.api_key);
        if let Some(token) = &offset {
            request = request.query(&[("offset", token)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DigestError::Fetch(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(fetch_http_error(status, &body));
        }

        response
            .json::<ListResponse>()
            .await
            .map_err(|e| DigestError::Fetch(format!("cannot parse airtable response: {e}")))
    }
}

/// Map a non-2xx list response to a fetch error.
fn fetch_http_error(status: reqwest::StatusCode, body: &str) -> DigestError {
    DigestError::Fetch(format!(
        "airtable returned HTTP {status}: {}",
        extract_error_message(body)
    ))
}

/// Pull a readable message out of an Airtable error body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                "no response body".to_owned()
            } else {
                body.chars().take(200).collect()
            }
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn list_response_parses_records_and_offset() {
        let page: ListResponse = serde_json::from_str(
            r#"{
                "records": [
                    {"id": "rec1", "fields": {"Project": "A", "Category": "cat1", "Do soon": true}},
                    {"id": "rec2", "fields": {"Project": "B", "Category": "cat2", "Done": true}}
                ],
                "offset": "itrNext"
            }"#,
        )
        .unwrap();

        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].fields.project, "A");
        assert!(page.records[0].fields.do_soon);
        assert!(!page.records[0].fields.done);
        assert!(page.records[1].fields.done);
        assert_eq!(page.offset.as_deref(), Some("itrNext"));
    }

    #[test]
    fn last_page_has_no_offset() {
        let page: ListResponse = serde_json::from_str(r#"{"records": []}"#).unwrap();
        assert!(page.records.is_empty());
        assert!(page.offset.is_none());
    }

    #[test]
    fn error_message_prefers_airtable_detail() {
        let body = r#"{"error": {"type": "AUTHENTICATION_REQUIRED", "message": "bad api key"}}"#;
        let err = fetch_http_error(reqwest::StatusCode::UNAUTHORIZED, body);
        assert!(err.to_string().contains("bad api key"));
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        let err = fetch_http_error(reqwest::StatusCode::BAD_GATEWAY, "upstream sad");
        assert!(err.to_string().contains("upstream sad"));

        let err = fetch_http_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "");
        assert!(err.to_string().contains("no response body"));
    }
}
