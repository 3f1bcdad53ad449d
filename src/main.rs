//! finowl-poster - binary entrypoint.
//! Loads configuration, wires the Finowl source, rewrite gateway and X publisher,
//! then either runs the scheduler loop or performs a one-off post.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use finowl_poster::config::{ai::AiConfig, AppConfig};
use finowl_poster::finowl::FinowlClient;
use finowl_poster::publish::{post_url, DryRunPublisher, Publisher, TwitterPublisher};
use finowl_poster::rewrite::{build_rewriter, DynRewriter};
use finowl_poster::{init_tracing, metrics, Scheduler, SchedulerConfig};

#[derive(Debug, Parser)]
#[command(name = "finowl-poster", version, about = "Posts Finowl market summaries to X")]
struct Cli {
    /// Run the Finowl summary loop forever.
    #[arg(long)]
    finowl: bool,

    /// Post a manual tweet with the given text.
    #[arg(long, value_name = "TEXT")]
    tweet: Option<String>,

    /// Delete a previously published post by ID.
    #[arg(long, value_name = "ID")]
    delete: Option<String>,

    /// Disable AI enhancement of posts.
    #[arg(long = "no-ai")]
    no_ai: bool,

    /// Message to post when no mode flag is given (defaults to DEFAULT_TWEET_TEXT).
    message: Option<String>,
}

fn build_publisher(cfg: &AppConfig) -> Result<Arc<dyn Publisher>> {
    match (&cfg.access_token, cfg.dry_run) {
        (Some(token), false) => Ok(Arc::new(TwitterPublisher::new(token.clone())?)),
        _ => {
            warn!("dry-run mode: posts are logged, not published");
            Ok(Arc::new(DryRunPublisher::new()))
        }
    }
}

fn build_ai(no_ai: bool) -> Result<Option<DynRewriter>> {
    if no_ai {
        info!("AI enhancement disabled by flag");
        return Ok(None);
    }
    let ai_cfg = AiConfig::load_default().context("loading AI config")?;
    let rewriter = build_rewriter(&ai_cfg)?;
    match &rewriter {
        Some(r) => info!(
            provider = r.provider_name(),
            model = %ai_cfg.model,
            key_len = ai_cfg.api_key.len(),
            "AI enhancement enabled"
        ),
        None => info!("AI enhancement disabled: no usable AI config"),
    }
    Ok(rewriter)
}

async fn post_once(publisher: &dyn Publisher, text: &str) -> Result<()> {
    let id = publisher.post(text).await.context("failed to post tweet")?;
    println!("Successfully posted tweet with ID: {id}");
    println!("View at: {}", post_url(&id));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; missing file is fine.
    let _ = dotenvy::dotenv();
    init_tracing("finowl_poster=info,warn");

    let cli = Cli::parse();
    info!("starting finowl-poster");

    let cfg = AppConfig::from_env().context("failed to load configuration")?;
    if let Some(addr) = cfg.metrics_addr {
        metrics::install_exporter(addr)?;
    }
    let publisher = build_publisher(&cfg)?;

    if let Some(id) = cli.delete.as_deref() {
        let deleted = publisher.delete(id).await.context("failed to delete tweet")?;
        println!("Deleted {id}: {deleted}");
        return Ok(());
    }

    if cli.finowl {
        info!(start_id = cfg.start_id, "starting in Finowl mode");
        let rewriter = build_ai(cli.no_ai)?;
        let source = Arc::new(FinowlClient::new(cfg.finowl_base_url.clone())?);
        info!(base_url = source.base_url(), "fetching summaries");
        let sched_cfg = SchedulerConfig {
            budget_ceiling: cfg.budget_ceiling,
            budget_reserve: cfg.budget_reserve,
            cooldown: cfg.cooldown,
            retry_delay: cfg.retry_delay,
            ..SchedulerConfig::default()
        };
        let mut scheduler =
            Scheduler::new(source, publisher, cfg.start_id, sched_cfg).with_rewriter(rewriter);
        scheduler.run(None).await;
        return Ok(());
    }

    let text = cli
        .tweet
        .or(cli.message)
        .unwrap_or_else(|| cfg.default_tweet_text.clone());
    post_once(publisher.as_ref(), &text).await
}
