//! Engine configuration: settings shared by every task loop.

use council_domain::ledger::DEFAULT_LEDGER_CAPACITY;
use council_domain::scheduling::{DEFAULT_RETRY_BASE_MS, IntervalBounds};
use council_domain::ConsensusRule;
use serde::{Deserialize, Serialize};

/// Engine-wide parameters.
///
/// Per-task parameters live in [`LoopOptions`](super::LoopOptions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How ballots are tallied and the quorum threshold.
    pub consensus_rule: ConsensusRule,
    /// Failed rounds in a row before a loop is marked failed.
    pub max_consecutive_errors: u32,
    /// Outcomes kept per loop in the performance ledger.
    pub ledger_capacity: usize,
    /// Base interval for retry backoff.
    pub retry_base_ms: u64,
    /// Clamp range for the inter-round interval.
    pub interval_bounds: IntervalBounds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            consensus_rule: ConsensusRule::default(),
            max_consecutive_errors: 5,
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
            retry_base_ms: DEFAULT_RETRY_BASE_MS,
            interval_bounds: IntervalBounds::default(),
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_consensus_rule(mut self, rule: ConsensusRule) -> Self {
        self.consensus_rule = rule;
        self
    }

    pub fn with_max_consecutive_errors(mut self, max: u32) -> Self {
        self.max_consecutive_errors = max.max(1);
        self
    }

    pub fn with_ledger_capacity(mut self, capacity: usize) -> Self {
        self.ledger_capacity = capacity;
        self
    }

    pub fn with_retry_base_ms(mut self, base_ms: u64) -> Self {
        self.retry_base_ms = base_ms;
        self
    }

    pub fn with_interval_bounds(mut self, bounds: IntervalBounds) -> Self {
        self.interval_bounds = bounds;
        self
    }
}
