// src/scheduler.rs
//! Publish scheduler: fetch → extract → (rewrite) → split → post loop → advance → cooldown.
//!
//! The scheduler exclusively owns the cursor (`current_id`) and the per-cycle
//! rate budget. Every core error is recovered here; nothing escapes `run`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::budget::RateBudget;
use crate::error::{PipelineError, PipelineResult};
use crate::finowl::types::SummarySource;
use crate::finowl::{extract, wait_until_available, PollPolicy};
use crate::metrics;
use crate::pacing::{Jitter, Sleeper, TokioSleeper, UniformJitter};
use crate::publish::{PostId, Publisher};
use crate::rewrite::{DynRewriter, PromptVariant};
use crate::segment::{clean_tickers, finalize_segment, split};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub budget_ceiling: u32,
    pub budget_reserve: u32,
    /// Pause after a successful cycle.
    pub cooldown: Duration,
    /// Pause after a failed cycle before retrying the same ID.
    pub retry_delay: Duration,
    /// Pause between posting and advancing the cursor.
    pub settle_delay: Duration,
    pub rewrite_timeout: Duration,
    pub availability: PollPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            budget_ceiling: 17,
            budget_reserve: 6,
            cooldown: Duration::from_secs(2 * 3600),
            retry_delay: Duration::from_secs(15 * 60),
            settle_delay: Duration::from_secs(60),
            rewrite_timeout: Duration::from_secs(80),
            availability: PollPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Fetching,
    Extracting,
    Rewriting,
    Posting,
    Cooldown,
    AwaitingAvailability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostMode {
    /// Rewrite as a thread and post every segment after the intro.
    Segmented,
    /// Rewrite as one block and post it once.
    Single,
}

#[derive(Debug)]
pub enum StopReason {
    /// Budget fell to the reserve floor.
    ReserveReached,
    /// Publisher rejected a post; later segments were skipped.
    PostFailed(PipelineError),
}

#[derive(Debug)]
pub struct PostReport {
    pub mode: PostMode,
    pub rewritten: bool,
    pub posted: Vec<PostId>,
    /// Candidates after the intro was skipped (segmented) or 1 (single).
    pub candidates: usize,
    pub stopped: Option<StopReason>,
    pub budget_remaining: u32,
}

#[derive(Debug)]
pub struct CycleReport {
    pub summary_id: u64,
    pub post: PostReport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub cycles: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub struct Scheduler {
    source: Arc<dyn SummarySource>,
    publisher: Arc<dyn Publisher>,
    rewriter: Option<DynRewriter>,
    sleeper: Arc<dyn Sleeper>,
    jitter: Arc<dyn Jitter>,
    cfg: SchedulerConfig,
    current_id: u64,
    budget: RateBudget,
    state: CycleState,
}

impl Scheduler {
    pub fn new(
        source: Arc<dyn SummarySource>,
        publisher: Arc<dyn Publisher>,
        start_id: u64,
        cfg: SchedulerConfig,
    ) -> Self {
        metrics::ensure_described();
        metrics::set_current_id(start_id);
        Self {
            source,
            publisher,
            rewriter: None,
            sleeper: Arc::new(TokioSleeper),
            jitter: Arc::new(UniformJitter::default()),
            budget: RateBudget::new(cfg.budget_ceiling, cfg.budget_reserve),
            cfg,
            current_id: start_id,
            state: CycleState::Idle,
        }
    }

    pub fn with_rewriter(mut self, rewriter: Option<DynRewriter>) -> Self {
        self.rewriter = rewriter;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_jitter(mut self, jitter: Arc<dyn Jitter>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn current_id(&self) -> u64 {
        self.current_id
    }

    pub fn budget(&self) -> &RateBudget {
        &self.budget
    }

    /// `Cooldown` after a successful `run_cycle`, `Idle` after a failed one or between
    /// iterations of `run`.
    pub fn state(&self) -> CycleState {
        self.state
    }

    fn enter(&mut self, state: CycleState) {
        debug!(target: "scheduler", from = ?self.state, to = ?state, summary_id = self.current_id, "state");
        self.state = state;
    }

    /// Move the cursor forward. Never moves it back.
    fn advance_to(&mut self, next: u64) {
        if next < self.current_id {
            warn!(
                target: "scheduler",
                current = self.current_id,
                requested = next,
                "refusing to move cursor backwards"
            );
            return;
        }
        self.current_id = next;
        metrics::set_current_id(next);
    }

    /// Loop until `max_cycles` iterations have run (`None` = forever).
    pub async fn run(&mut self, max_cycles: Option<usize>) -> RunStats {
        let mut stats = RunStats::default();
        info!(
            target: "scheduler",
            source = self.source.name(),
            publisher = self.publisher.name(),
            start_id = self.current_id,
            budget_ceiling = self.budget.ceiling(),
            budget_reserve = self.budget.reserve(),
            "scheduler starting"
        );
        loop {
            if max_cycles.is_some_and(|max| stats.cycles >= max) {
                break;
            }
            stats.cycles += 1;
            info!(target: "scheduler", summary_id = self.current_id, "processing summary");

            match self.run_cycle().await {
                Ok(report) => {
                    stats.succeeded += 1;
                    metrics::record_cycle();
                    info!(
                        target: "scheduler",
                        summary_id = report.summary_id,
                        posted = report.post.posted.len(),
                        mode = ?report.post.mode,
                        next_id = self.current_id,
                        cooldown_secs = self.cfg.cooldown.as_secs(),
                        "summary posted, cooling down"
                    );
                    self.sleeper.sleep(self.cfg.cooldown).await;
                }
                Err(e) => {
                    stats.failed += 1;
                    metrics::record_cycle_error(e.kind());
                    self.recover(e).await;
                }
            }
            self.enter(CycleState::Idle);
        }
        stats
    }

    /// One pass over `current_id`. The cursor moves only if this returns `Ok`,
    /// which leaves the scheduler in `Cooldown`; an error leaves it `Idle`.
    pub async fn run_cycle(&mut self) -> PipelineResult<CycleReport> {
        let outcome = self.process_current().await;
        match outcome {
            Ok(_) => self.enter(CycleState::Cooldown),
            Err(_) => self.enter(CycleState::Idle),
        }
        outcome
    }

    async fn process_current(&mut self) -> PipelineResult<CycleReport> {
        self.enter(CycleState::Fetching);
        let summary = self.source.fetch(self.current_id).await?;

        self.enter(CycleState::Extracting);
        let sections = extract(&summary.content)?;
        debug!(target: "scheduler", summary_id = summary.id, featured = %sections.featured, "featured section");
        debug!(target: "scheduler", summary_id = summary.id, insights = %sections.insights, "insights section");
        debug!(target: "scheduler", summary_id = summary.id, sentiment = %sections.sentiment, "sentiment section");

        // Only the featured section is published per cycle.
        let post = self.post_section(&sections.featured).await;

        self.sleeper.sleep(self.cfg.settle_delay).await;
        self.advance_to(summary.id.saturating_add(1));

        Ok(CycleReport {
            summary_id: summary.id,
            post,
        })
    }

    /// Budget-driven posting of one section. Post failures end the step but not the cycle.
    pub async fn post_section(&mut self, content: &str) -> PostReport {
        self.budget.reset();
        metrics::set_budget_remaining(self.budget.remaining());

        if self.budget.has_headroom() {
            self.post_segments(content).await
        } else {
            self.post_single(content).await
        }
    }

    async fn post_segments(&mut self, content: &str) -> PostReport {
        self.enter(CycleState::Rewriting);
        let rewritten = self.rewrite(content, PromptVariant::Segmented).await;
        let text = rewritten.as_deref().unwrap_or(content);

        self.enter(CycleState::Posting);
        let segments = split(text);
        // The first segment is the intro; it is never posted on its own.
        let candidates = segments.len().saturating_sub(1);
        if candidates == 0 {
            warn!(target: "scheduler", segments = segments.len(), "no segments to post after intro");
        }

        let mut report = PostReport {
            mode: PostMode::Segmented,
            rewritten: rewritten.is_some(),
            posted: Vec::new(),
            candidates,
            stopped: None,
            budget_remaining: self.budget.remaining(),
        };

        for (i, segment) in segments.iter().enumerate().skip(1) {
            let text = finalize_segment(segment);
            let pause = self.jitter.next_delay();

            match self.publisher.post(&text).await {
                Ok(id) => {
                    metrics::record_post();
                    let remaining = self.budget.consume();
                    metrics::set_budget_remaining(remaining);
                    info!(target: "scheduler", segment = i, post_id = %id, remaining, "posted segment");
                    report.posted.push(id);

                    if self.budget.at_reserve() {
                        info!(
                            target: "scheduler",
                            remaining,
                            "reached reserve, stopping to preserve rate limit for summaries"
                        );
                        report.stopped = Some(StopReason::ReserveReached);
                        break;
                    }
                }
                Err(e) => {
                    metrics::record_post_failure();
                    let err = PipelineError::PostFailed {
                        target: format!("segment {i}"),
                        cause: format!("{e:#}"),
                    };
                    warn!(target: "scheduler", error = %err, "stopping segment posting");
                    report.stopped = Some(StopReason::PostFailed(err));
                    break;
                }
            }

            self.sleeper.sleep(pause).await;
        }

        report.budget_remaining = self.budget.remaining();
        report
    }

    async fn post_single(&mut self, content: &str) -> PostReport {
        self.enter(CycleState::Rewriting);
        let rewritten = self.rewrite(content, PromptVariant::Single).await;
        let text = rewritten.as_deref().unwrap_or(content);

        self.enter(CycleState::Posting);
        let mut report = PostReport {
            mode: PostMode::Single,
            rewritten: rewritten.is_some(),
            posted: Vec::new(),
            candidates: 1,
            stopped: None,
            budget_remaining: self.budget.remaining(),
        };

        match self.publisher.post(text).await {
            Ok(id) => {
                metrics::record_post();
                let remaining = self.budget.consume();
                metrics::set_budget_remaining(remaining);
                info!(target: "scheduler", post_id = %id, remaining, "posted full content");
                if self.budget.is_exhausted() {
                    info!(target: "scheduler", "rate budget exhausted");
                }
                report.posted.push(id);
            }
            Err(e) => {
                metrics::record_post_failure();
                let err = PipelineError::PostFailed {
                    target: "full content".to_string(),
                    cause: format!("{e:#}"),
                };
                warn!(target: "scheduler", error = %err, "post failed");
                report.stopped = Some(StopReason::PostFailed(err));
            }
        }

        report.budget_remaining = self.budget.remaining();
        report
    }

    /// `Some(cleaned)` on success; `None` when skipped or failed (caller keeps the original).
    async fn rewrite(&self, content: &str, variant: PromptVariant) -> Option<String> {
        let rewriter = self.rewriter.as_ref()?;
        let prompt = variant.system_prompt();

        match tokio::time::timeout(self.cfg.rewrite_timeout, rewriter.enhance(content, &prompt)).await {
            Ok(Ok(text)) => {
                info!(
                    target: "scheduler",
                    provider = rewriter.provider_name(),
                    variant = variant.as_str(),
                    "enhanced content with AI"
                );
                Some(clean_tickers(&text))
            }
            Ok(Err(e)) => {
                metrics::record_rewrite_failure();
                let cause = format!("{e:#}");
                warn!(
                    target: "scheduler",
                    error = %cause,
                    "failed to enhance content with AI, using original content"
                );
                None
            }
            Err(_) => {
                metrics::record_rewrite_failure();
                warn!(
                    target: "scheduler",
                    timeout_secs = self.cfg.rewrite_timeout.as_secs(),
                    "AI rewrite timed out, using original content"
                );
                None
            }
        }
    }

    /// Error boundary for a failed cycle. Never advances past an unprocessed ID.
    async fn recover(&mut self, err: PipelineError) {
        match err {
            ref e if e.is_not_found() && self.current_id > 0 => {
                info!(target: "scheduler", summary_id = self.current_id, "waiting for summary to become available");
                self.await_availability().await;
            }
            PipelineError::MissingSections { ref names } => {
                error!(
                    target: "scheduler",
                    summary_id = self.current_id,
                    missing = ?names,
                    retry_secs = self.cfg.retry_delay.as_secs(),
                    "summary content malformed, operator attention needed"
                );
                self.sleeper.sleep(self.cfg.retry_delay).await;
            }
            ref e => {
                warn!(
                    target: "scheduler",
                    error = %e,
                    kind = e.kind(),
                    transient = e.is_transient(),
                    summary_id = self.current_id,
                    retry_secs = self.cfg.retry_delay.as_secs(),
                    "error processing summary, retrying later"
                );
                self.sleeper.sleep(self.cfg.retry_delay).await;
            }
        }
    }

    /// Poll until `current_id` exists, then point the cursor at the discovered ID.
    /// The next cycle fetches that ID again and processes it.
    async fn await_availability(&mut self) {
        self.enter(CycleState::AwaitingAvailability);
        let after = self.current_id.saturating_sub(1);
        let found = wait_until_available(
            self.source.as_ref(),
            after,
            &self.cfg.availability,
            self.sleeper.as_ref(),
        )
        .await;

        match found {
            Ok(summary) => {
                info!(target: "scheduler", summary_id = summary.id, "summary became available");
                self.advance_to(summary.id);
            }
            Err(e) => {
                warn!(
                    target: "scheduler",
                    error = %e,
                    retry_secs = self.cfg.retry_delay.as_secs(),
                    "error waiting for next summary"
                );
                self.sleeper.sleep(self.cfg.retry_delay).await;
            }
        }
    }
}
