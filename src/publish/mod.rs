// src/publish/mod.rs
pub mod twitter;

use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};

pub use twitter::TwitterPublisher;

/// Opaque identifier returned by the posting API.
pub type PostId = String;

#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `text`; returns the new post's identifier.
    async fn post(&self, text: &str) -> Result<PostId>;
    /// Delete a previously published post. Not used by the scheduler cycle.
    async fn delete(&self, id: &str) -> Result<bool>;
    fn name(&self) -> &'static str;
}

/// Logs instead of publishing. IDs are `dry-run-1`, `dry-run-2`, ...
#[derive(Debug, Default)]
pub struct DryRunPublisher {
    seq: AtomicU64,
}

impl DryRunPublisher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Publisher for DryRunPublisher {
    async fn post(&self, text: &str) -> Result<PostId> {
        let n = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(target: "publish", chars = text.chars().count(), "dry-run post:\n{text}");
        Ok(format!("dry-run-{n}"))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        tracing::info!(target: "publish", id, "dry-run delete");
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

/// Public URL for a post id.
pub fn post_url(id: &str) -> String {
    format!("https://twitter.com/user/status/{id}")
}
