// src/rewrite/chat.rs
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{RewriteFuture, Rewriter};
use crate::config::ai::AiConfig;

/// OpenAI-compatible chat-completions client (DeepSeek by default).
pub struct ChatCompletionsRewriter {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    #[serde(default)]
    content: String,
}

impl ChatCompletionsRewriter {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("finowl-poster/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()
            .context("building rewrite http client")?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn from_config(cfg: &AiConfig) -> anyhow::Result<Self> {
        Self::new(
            &cfg.base_url,
            cfg.api_key.clone(),
            cfg.model.clone(),
            Duration::from_secs(cfg.timeout_secs),
        )
    }

    async fn enhance_impl(&self, content: &str, system_prompt: &str) -> anyhow::Result<String> {
        tracing::debug!(
            target: "rewrite",
            model = %self.model,
            prompt_len = system_prompt.len(),
            content_len = content.len(),
            "requesting rewrite"
        );

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: system_prompt,
                },
                Msg {
                    role: "user",
                    content,
                },
            ],
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("rewrite request")?
            .error_for_status()
            .context("rewrite non-2xx")?;

        let body: Resp = resp.json().await.context("rewrite response body")?;
        let text = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("AI failed to enhance content: empty response"))?;

        if text.trim().is_empty() {
            return Err(anyhow!("AI failed to enhance content: blank message"));
        }
        Ok(text)
    }
}

impl Rewriter for ChatCompletionsRewriter {
    fn enhance<'a>(&'a self, content: &'a str, system_prompt: &'a str) -> RewriteFuture<'a> {
        Box::pin(self.enhance_impl(content, system_prompt))
    }
    fn provider_name(&self) -> &'static str {
        "chat-completions"
    }
}
