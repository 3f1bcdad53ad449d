// src/finowl/mod.rs
pub mod client;
pub mod sections;
pub mod types;

use std::time::Duration;

use crate::error::{PipelineError, PipelineResult};
use crate::finowl::types::{Summary, SummarySource};
use crate::metrics;
use crate::pacing::Sleeper;

pub use client::FinowlClient;
pub use sections::{extract, SectionSet};

/// Polling schedule for `wait_until_available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls forever.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15 * 60),
            max_attempts: None,
        }
    }
}

/// Poll `after_id + 1` until it exists.
///
/// Not-found sleeps `policy.interval` and tries again; any other error is
/// returned immediately. With a bounded policy, running out of attempts
/// returns the last `SummaryNotFound`.
pub async fn wait_until_available(
    source: &dyn SummarySource,
    after_id: u64,
    policy: &PollPolicy,
    sleeper: &dyn Sleeper,
) -> PipelineResult<Summary> {
    let next_id = after_id.saturating_add(1);
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        match source.fetch(next_id).await {
            Ok(summary) => return Ok(summary),
            Err(PipelineError::SummaryNotFound { id }) => {
                metrics::record_not_found_poll();
                if policy.max_attempts.is_some_and(|max| attempts >= max) {
                    return Err(PipelineError::SummaryNotFound { id });
                }
                tracing::info!(
                    target: "finowl",
                    summary_id = next_id,
                    wait_secs = policy.interval.as_secs(),
                    "summary not yet available, waiting"
                );
                sleeper.sleep(policy.interval).await;
            }
            Err(e) => return Err(e),
        }
    }
}
