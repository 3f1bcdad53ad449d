// src/rewrite/mod.rs
//! Rewrite gateway: provider abstraction for generative text improvement.
//! Failures are never fatal to the caller; the scheduler falls back to the input text.

pub mod chat;
pub mod prompts;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::ai::AiConfig;

pub use chat::ChatCompletionsRewriter;
pub use prompts::PromptVariant;

pub type RewriteFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;

/// Trait object used by the scheduler (and stubbed in tests).
pub trait Rewriter: Send + Sync {
    /// Rewrite `content` under `system_prompt`; returns the new text or an error.
    fn enhance<'a>(&'a self, content: &'a str, system_prompt: &'a str) -> RewriteFuture<'a>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynRewriter = Arc<dyn Rewriter>;

/// Deterministic rewriter for local runs (`AI_TEST_MODE=mock`).
#[derive(Clone)]
pub struct MockRewriter {
    pub fixed: String,
}

impl Rewriter for MockRewriter {
    fn enhance<'a>(&'a self, _content: &'a str, _system_prompt: &'a str) -> RewriteFuture<'a> {
        let out = self.fixed.clone();
        Box::pin(async move { Ok(out) })
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Factory: build a rewriter according to config and environment variables.
///
/// * `AI_TEST_MODE=mock` → a mock that echoes a fixed two-segment thread.
/// * config not usable (disabled or no key) → `None`, rewriting is skipped.
/// * otherwise the chat-completions provider.
pub fn build_rewriter(cfg: &AiConfig) -> anyhow::Result<Option<DynRewriter>> {
    if std::env::var("AI_TEST_MODE").is_ok_and(|v| v == "mock") {
        let fixed = format!(
            "Markets wake up (mock)\n{brk}\n**$BTC** holds the line (mock)\n{brk}\n**$ETH** follows (mock)",
            brk = crate::segment::PROJECT_BREAK
        );
        return Ok(Some(Arc::new(MockRewriter { fixed })));
    }
    if !cfg.is_usable() {
        return Ok(None);
    }
    let client = ChatCompletionsRewriter::from_config(cfg)?;
    Ok(Some(Arc::new(client)))
}
