// src/config/mod.rs
//! Startup configuration. Everything here is read once before the loop begins;
//! errors are fatal; `main` bails out on them.

pub mod ai;

use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::finowl::client::DEFAULT_BASE_URL;

pub const ENV_START_ID: &str = "FINOWL_START_ID";
pub const ENV_BASE_URL: &str = "FINOWL_BASE_URL";
pub const ENV_ACCESS_TOKEN: &str = "X_USER_ACCESS_TOKEN";
pub const ENV_DEFAULT_TEXT: &str = "DEFAULT_TWEET_TEXT";
pub const ENV_DRY_RUN: &str = "POST_DRY_RUN";
pub const ENV_BUDGET_CEILING: &str = "RATE_BUDGET_CEILING";
pub const ENV_BUDGET_RESERVE: &str = "RATE_BUDGET_RESERVE";
pub const ENV_COOLDOWN_SECS: &str = "CYCLE_COOLDOWN_SECS";
pub const ENV_RETRY_DELAY_SECS: &str = "RETRY_DELAY_SECS";
pub const ENV_METRICS_ADDR: &str = "METRICS_ADDR";

pub const DEFAULT_START_ID: u64 = 105;
pub const DEFAULT_TWEET_TEXT: &str = "This is an automated tweet from finowl-poster!";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub start_id: u64,
    pub finowl_base_url: String,
    /// OAuth 2.0 user-context token for the X API. `None` only in dry-run.
    pub access_token: Option<String>,
    pub default_tweet_text: String,
    pub dry_run: bool,
    pub budget_ceiling: u32,
    pub budget_reserve: u32,
    pub cooldown: Duration,
    pub retry_delay: Duration,
    pub metrics_addr: Option<SocketAddr>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let start_id = match env::var(ENV_START_ID) {
            Ok(v) if !v.trim().is_empty() => v
                .trim()
                .parse::<u64>()
                .map_err(|_| anyhow!("invalid {ENV_START_ID}: must be a number"))?,
            _ => DEFAULT_START_ID,
        };

        let dry_run = env_flag(ENV_DRY_RUN);
        let access_token = env::var(ENV_ACCESS_TOKEN)
            .ok()
            .filter(|t| !t.trim().is_empty());
        if access_token.is_none() && !dry_run {
            return Err(anyhow!(
                "missing {ENV_ACCESS_TOKEN} (set {ENV_DRY_RUN}=1 to run without posting)"
            ));
        }

        let budget_ceiling = env_parse(ENV_BUDGET_CEILING, 17u32)?;
        let budget_reserve = env_parse(ENV_BUDGET_RESERVE, 6u32)?;

        let metrics_addr = match env::var(ENV_METRICS_ADDR) {
            Ok(v) if !v.trim().is_empty() => Some(
                v.trim()
                    .parse::<SocketAddr>()
                    .with_context(|| format!("invalid {ENV_METRICS_ADDR}: {v}"))?,
            ),
            _ => None,
        };

        Ok(Self {
            start_id,
            finowl_base_url: env::var(ENV_BASE_URL)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            access_token,
            default_tweet_text: env::var(ENV_DEFAULT_TEXT)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TWEET_TEXT.to_string()),
            dry_run,
            budget_ceiling,
            budget_reserve,
            cooldown: Duration::from_secs(env_parse(ENV_COOLDOWN_SECS, 2 * 3600u64)?),
            retry_delay: Duration::from_secs(env_parse(ENV_RETRY_DELAY_SECS, 15 * 60u64)?),
            metrics_addr,
        })
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<T>()
            .map_err(|_| anyhow!("invalid {key}: {v}")),
        _ => Ok(default),
    }
}
