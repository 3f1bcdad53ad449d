// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod budget;
pub mod config;
pub mod error;
pub mod finowl;
pub mod metrics;
pub mod pacing;
pub mod publish;
pub mod rewrite;
pub mod scheduler;
pub mod segment;

// ---- Re-exports for stable public API ----
pub use crate::error::{PipelineError, PipelineResult};
pub use crate::finowl::sections::{extract, SectionSet};
pub use crate::scheduler::{Scheduler, SchedulerConfig};
pub use crate::segment::split;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber once per process.
///
/// `RUST_LOG` wins over `default_filter`; `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let res = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
    if let Err(e) = res {
        eprintln!("tracing already initialised: {e}");
    }
}
