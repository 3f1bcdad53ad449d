// src/finowl/client.rs
use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use crate::error::{PipelineError, PipelineResult};
use crate::finowl::types::{Summary, SummaryResponse, SummarySource};

pub const DEFAULT_BASE_URL: &str = "https://finowl.finance/api/v0/summary";

/// HTTP client for the Finowl summary endpoint (`GET {base}?id=N`).
#[derive(Clone)]
pub struct FinowlClient {
    http: reqwest::Client,
    base_url: String,
}

impl FinowlClient {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("finowl-poster/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("building finowl http client")?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Decode a 200 body into a `Summary`. Anything undecodable is a request failure.
pub fn parse_summary_body(body: &str) -> PipelineResult<Summary> {
    let parsed: SummaryResponse = serde_json::from_str(body).map_err(|e| {
        PipelineError::request_failed(format!("failed to unmarshal response: {e}"))
    })?;
    Ok(parsed.summary)
}

#[async_trait]
impl SummarySource for FinowlClient {
    async fn fetch(&self, id: u64) -> PipelineResult<Summary> {
        tracing::debug!(target: "finowl", summary_id = id, url = %self.base_url, "fetching summary");

        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("id", id)])
            .send()
            .await
            .map_err(PipelineError::request_failed)?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PipelineError::SummaryNotFound { id });
        }
        if !status.is_success() {
            return Err(PipelineError::UnexpectedStatus {
                code: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| {
            PipelineError::request_failed(format!("failed to read response body: {e}"))
        })?;
        parse_summary_body(&body)
    }

    fn name(&self) -> &'static str {
        "finowl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_envelope() {
        let body = r###"{"summary":{"id":105,"timestamp":"2025-02-01T12:00:00Z","content":"## Featured Tickers and Projects\nx"},"total":300}"###;
        let s = parse_summary_body(body).unwrap();
        assert_eq!(s.id, 105);
        assert!(s.content.starts_with("## Featured"));
    }

    #[test]
    fn malformed_body_is_request_failure() {
        let err = parse_summary_body("{not json").unwrap_err();
        assert!(matches!(err, PipelineError::RequestFailed { .. }), "{err:?}");
    }

    #[test]
    fn missing_summary_field_is_request_failure() {
        let err = parse_summary_body(r#"{"total":3}"#).unwrap_err();
        assert!(matches!(err, PipelineError::RequestFailed { .. }));
    }
}
