// src/metrics.rs
use anyhow::Context;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::OnceCell;
use std::net::SocketAddr;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "poster_cycles_total",
            "Cycles that completed and advanced the cursor, including ones that posted nothing."
        );
        describe_counter!(
            "poster_cycle_errors_total",
            "Cycles aborted before posting, by error kind."
        );
        describe_counter!("poster_posts_total", "Posts accepted by the publisher.");
        describe_counter!(
            "poster_post_failures_total",
            "Posts rejected by the publisher."
        );
        describe_counter!(
            "poster_rewrite_failures_total",
            "Rewrite attempts that fell back to the original text."
        );
        describe_counter!(
            "poster_not_found_polls_total",
            "Availability polls that found no summary yet."
        );
        describe_gauge!("poster_current_id", "Next summary ID the scheduler will fetch.");
        describe_gauge!(
            "poster_rate_budget_remaining",
            "Posts left in the current cycle's budget."
        );
    });
}

/// Install the Prometheus recorder with its own HTTP listener on `addr`.
/// Must be called from inside a tokio runtime.
pub fn install_exporter(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .context("prometheus: install exporter")?;
    ensure_described();
    tracing::info!(%addr, "metrics exporter listening");
    Ok(())
}

pub fn record_cycle() {
    counter!("poster_cycles_total").increment(1);
}

pub fn record_cycle_error(kind: &'static str) {
    counter!("poster_cycle_errors_total", "kind" => kind).increment(1);
}

pub fn record_post() {
    counter!("poster_posts_total").increment(1);
}

pub fn record_post_failure() {
    counter!("poster_post_failures_total").increment(1);
}

pub fn record_rewrite_failure() {
    counter!("poster_rewrite_failures_total").increment(1);
}

pub fn record_not_found_poll() {
    counter!("poster_not_found_polls_total").increment(1);
}

pub fn set_current_id(id: u64) {
    gauge!("poster_current_id").set(id as f64);
}

pub fn set_budget_remaining(remaining: u32) {
    gauge!("poster_rate_budget_remaining").set(f64::from(remaining));
}
