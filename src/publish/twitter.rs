// src/publish/twitter.rs
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{PostId, Publisher};

pub const DEFAULT_API_BASE: &str = "https://api.twitter.com";

/// X API v2 client authenticated with an OAuth 2.0 user-context bearer token.
#[derive(Clone)]
pub struct TwitterPublisher {
    api_base: String,
    token: String,
    client: Client,
}

#[derive(Serialize)]
struct CreateReq<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct CreateResp {
    data: CreateData,
}

#[derive(Deserialize)]
struct CreateData {
    id: String,
}

#[derive(Deserialize)]
struct DeleteResp {
    data: DeleteData,
}

#[derive(Deserialize)]
struct DeleteData {
    deleted: bool,
}

impl TwitterPublisher {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base(DEFAULT_API_BASE, token)
    }

    /// Point at a different API host (tests use a mock server).
    pub fn with_base(api_base: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("finowl-poster/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .context("building x http client")?;
        Ok(Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl Publisher for TwitterPublisher {
    async fn post(&self, text: &str) -> Result<PostId> {
        let url = format!("{}/2/tweets", self.api_base);
        let rsp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&CreateReq { text })
            .send()
            .await
            .context("failed to post tweet")?;

        let status = rsp.status();
        if !status.is_success() {
            let body = rsp.text().await.unwrap_or_default();
            return Err(anyhow!("failed to post tweet: HTTP {status}: {body}"));
        }
        let body: CreateResp = rsp.json().await.context("tweet create response")?;
        Ok(body.data.id)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let url = format!("{}/2/tweets/{id}", self.api_base);
        let body: DeleteResp = self
            .client
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("failed to delete tweet")?
            .error_for_status()
            .context("tweet delete non-2xx")?
            .json()
            .await
            .context("tweet delete response")?;
        Ok(body.data.deleted)
    }

    fn name(&self) -> &'static str {
        "x"
    }
}
