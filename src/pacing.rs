// src/pacing.rs
//! Injectable waiting: how long to pause between posts, and how to pause.
//!
//! Production wires `TokioSleeper` + `UniformJitter`; tests wire
//! `RecordingSleeper` + `FixedJitter` so loops run instantly and deterministically.

use rand::Rng;
use std::sync::Mutex;
use std::time::Duration;

/// Lower bound of the human-pacing pause between segment posts.
pub const SEGMENT_PAUSE_MIN_SECS: u64 = 600;
/// Upper bound (exclusive) of the human-pacing pause.
pub const SEGMENT_PAUSE_MAX_SECS: u64 = 1600;

#[async_trait::async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, dur: Duration);
}

/// Real wall-clock sleeping on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait::async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, dur: Duration) {
        tokio::time::sleep(dur).await;
    }
}

/// Returns immediately and remembers every requested duration.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    calls: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.calls().into_iter().sum()
    }
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, dur: Duration) {
        if let Ok(mut g) = self.calls.lock() {
            g.push(dur);
        }
    }
}

pub trait Jitter: Send + Sync {
    fn next_delay(&self) -> Duration;
}

/// Uniform random pause in `[min, max)` seconds.
#[derive(Debug, Clone, Copy)]
pub struct UniformJitter {
    min_secs: u64,
    max_secs: u64,
}

impl UniformJitter {
    /// `max_secs <= min_secs` degrades to a fixed `min_secs` pause.
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        Self { min_secs, max_secs }
    }
}

impl Default for UniformJitter {
    fn default() -> Self {
        Self::new(SEGMENT_PAUSE_MIN_SECS, SEGMENT_PAUSE_MAX_SECS)
    }
}

impl Jitter for UniformJitter {
    fn next_delay(&self) -> Duration {
        if self.max_secs <= self.min_secs {
            return Duration::from_secs(self.min_secs);
        }
        let secs = rand::rng().random_range(self.min_secs..self.max_secs);
        Duration::from_secs(secs)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub Duration);

impl Jitter for FixedJitter {
    fn next_delay(&self) -> Duration {
        self.0
    }
}
