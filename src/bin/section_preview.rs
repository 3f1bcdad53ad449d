//! Fetch one summary (or read a local file) and print what the poster would extract. Never posts.

use anyhow::{Context, Result};
use clap::Parser;

use finowl_poster::config::ENV_BASE_URL;
use finowl_poster::finowl::client::{parse_summary_body, DEFAULT_BASE_URL};
use finowl_poster::finowl::types::SummarySource;
use finowl_poster::finowl::FinowlClient;
use finowl_poster::segment::{clean_tickers, finalize_segment, split};
use finowl_poster::{extract, init_tracing};

#[derive(Debug, Parser)]
#[command(name = "section-preview")]
struct Args {
    /// Summary ID to fetch.
    #[arg(required_unless_present = "file")]
    id: Option<u64>,

    /// Read a saved API response (JSON) or raw summary body instead of fetching.
    #[arg(long)]
    file: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing("finowl_poster=warn");
    let args = Args::parse();

    let content = match (&args.file, args.id) {
        (Some(path), _) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            match parse_summary_body(&raw) {
                Ok(summary) => summary.content,
                Err(_) => raw,
            }
        }
        (None, Some(id)) => {
            let base = std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
            let client = FinowlClient::new(base)?;
            client.fetch(id).await?.content
        }
        (None, None) => anyhow::bail!("pass a summary ID or --file"),
    };

    let sections = extract(&content)?;
    for (title, body) in [
        ("Featured", &sections.featured),
        ("Insights", &sections.insights),
        ("Sentiment", &sections.sentiment),
    ] {
        println!("==== {title} ({} chars) ====", body.chars().count());
        println!("{body}\n");
    }

    let segments = split(&clean_tickers(&sections.featured));
    println!("==== featured split into {} segment(s) ====", segments.len());
    for (i, seg) in segments.iter().enumerate() {
        let marker = if i == 0 { " (intro, skipped)" } else { "" };
        println!("--- #{i}{marker}\n{}", finalize_segment(seg));
    }
    Ok(())
}
