// tests/common/mod.rs
// In-memory collaborators for scheduler tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use finowl_poster::error::{PipelineError, PipelineResult};
use finowl_poster::finowl::types::{Summary, SummarySource};
use finowl_poster::finowl::PollPolicy;
use finowl_poster::publish::{PostId, Publisher};
use finowl_poster::rewrite::{RewriteFuture, Rewriter};
use finowl_poster::segment::PROJECT_BREAK;
use finowl_poster::SchedulerConfig;
use parking_lot::Mutex;

pub const GOOD_BODY: &str = "## Featured Tickers and Projects\n**$ABC** up\n## Key Insights from Influencers\nX said Y\n## Market Sentiment and Directions\nBullish";

pub fn summary(id: u64, content: &str) -> Summary {
    Summary {
        id,
        timestamp: Utc::now(),
        content: content.to_string(),
    }
}

/// Serves summaries from a map. A script of outcomes is consumed first:
/// `Some(err)` fails that call, `None` falls through to the map.
#[derive(Default)]
pub struct StubSource {
    summaries: Mutex<HashMap<u64, Summary>>,
    script: Mutex<VecDeque<Option<PipelineError>>>,
    calls: Mutex<Vec<u64>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(self, id: u64, content: &str) -> Self {
        self.summaries.lock().insert(id, summary(id, content));
        self
    }

    pub fn then_fail(self, err: PipelineError) -> Self {
        self.script.lock().push_back(Some(err));
        self
    }

    pub fn then_serve(self) -> Self {
        self.script.lock().push_back(None);
        self
    }

    pub fn calls(&self) -> Vec<u64> {
        self.calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl SummarySource for StubSource {
    async fn fetch(&self, id: u64) -> PipelineResult<Summary> {
        self.calls.lock().push(id);
        if let Some(Some(err)) = self.script.lock().pop_front() {
            return Err(err);
        }
        self.summaries
            .lock()
            .get(&id)
            .cloned()
            .ok_or(PipelineError::SummaryNotFound { id })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Records every post; fails the Nth call (1-based) if `fail_on` is set.
#[derive(Default)]
pub struct StubPublisher {
    posted: Mutex<Vec<String>>,
    attempts: Mutex<usize>,
    fail_on: Option<usize>,
}

impl StubPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on: Some(n),
            ..Self::default()
        }
    }

    pub fn posted(&self) -> Vec<String> {
        self.posted.lock().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

#[async_trait::async_trait]
impl Publisher for StubPublisher {
    async fn post(&self, text: &str) -> anyhow::Result<PostId> {
        let n = {
            let mut a = self.attempts.lock();
            *a += 1;
            *a
        };
        if self.fail_on == Some(n) {
            anyhow::bail!("429 Too Many Requests");
        }
        let mut posted = self.posted.lock();
        posted.push(text.to_string());
        Ok(format!("post-{}", posted.len()))
    }

    async fn delete(&self, _id: &str) -> anyhow::Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Returns a fixed reply (or error) and records the system prompts it was given.
pub struct StubRewriter {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl StubRewriter {
    pub fn ok(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(msg: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(msg.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

impl Rewriter for StubRewriter {
    fn enhance<'a>(&'a self, _content: &'a str, system_prompt: &'a str) -> RewriteFuture<'a> {
        self.prompts.lock().push(system_prompt.to_string());
        let reply = self.reply.clone();
        Box::pin(async move { reply.map_err(|e| anyhow::anyhow!(e)) })
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

/// Never answers; only a timeout gets the caller out.
pub struct StalledRewriter;

impl Rewriter for StalledRewriter {
    fn enhance<'a>(&'a self, _content: &'a str, _system_prompt: &'a str) -> RewriteFuture<'a> {
        Box::pin(std::future::pending())
    }

    fn provider_name(&self) -> &'static str {
        "stalled"
    }
}

/// Intro plus `n` project blocks joined by the break token.
pub fn thread_of(n: usize) -> String {
    let mut blocks = vec!["Today in crypto".to_string()];
    blocks.extend((1..=n).map(|i| format!("**$T{i}** is moving")));
    blocks.join(&format!("\n{PROJECT_BREAK}\n"))
}

pub const JITTER: Duration = Duration::from_secs(5);

pub fn test_config() -> SchedulerConfig {
    SchedulerConfig {
        budget_ceiling: 17,
        budget_reserve: 6,
        cooldown: Duration::from_secs(7200),
        retry_delay: Duration::from_secs(900),
        settle_delay: Duration::from_secs(60),
        rewrite_timeout: Duration::from_secs(80),
        availability: PollPolicy {
            interval: Duration::from_secs(900),
            max_attempts: Some(10),
        },
    }
}
