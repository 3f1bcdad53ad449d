// src/finowl/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineResult;

/// One numbered market report. Read-only once fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Summary {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub content: String,
}

/// Envelope returned by `GET /summary?id=N`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryResponse {
    pub summary: Summary,
    #[serde(default)]
    pub total: u64,
}

#[async_trait::async_trait]
pub trait SummarySource: Send + Sync {
    /// One request per call; classifies the outcome into `PipelineError`.
    async fn fetch(&self, id: u64) -> PipelineResult<Summary>;
    fn name(&self) -> &'static str;
}
