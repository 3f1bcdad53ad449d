// src/budget.rs

/// Per-cycle post allowance with a reserve kept back for later summaries.
///
/// - `reset` refills to the ceiling at the start of each posting cycle.
/// - `consume` is called once per successful post.
/// - Multi-segment posting is allowed only while `remaining > reserve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBudget {
    ceiling: u32,
    reserve: u32,
    remaining: u32,
}

impl RateBudget {
    pub fn new(ceiling: u32, reserve: u32) -> Self {
        Self {
            ceiling,
            reserve,
            remaining: ceiling,
        }
    }

    pub fn reset(&mut self) {
        self.remaining = self.ceiling;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn reserve(&self) -> u32 {
        self.reserve
    }

    /// Room for segment posting without touching the reserve.
    pub fn has_headroom(&self) -> bool {
        self.remaining > self.reserve
    }

    pub fn at_reserve(&self) -> bool {
        self.remaining <= self.reserve
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Returns what is left afterwards. Never underflows.
    pub fn consume(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }
}

impl Default for RateBudget {
    fn default() -> Self {
        Self::new(17, 6)
    }
}
