//! Loop options: per-task parameters given at submission.

use council_domain::StrategyKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Options for one task loop.
///
/// A loop keeps running rounds until it is stopped, reaches `max_rounds`,
/// reaches quorum with `stop_on_quorum`, or fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopOptions {
    /// Use this strategy every round instead of the rule table.
    pub strategy_override: Option<StrategyKind>,
    /// Agents leased per round.
    pub max_agents: usize,
    /// Deadline for each agent in the response phase.
    pub per_agent_timeout: Duration,
    /// Task complexity (0.0 to 1.0) for strategy selection.
    pub complexity: f64,
    /// Allow the experimental strategy.
    pub experimental: bool,
    /// Stop after this many successful rounds.
    pub max_rounds: Option<u32>,
    /// Stop as soon as a round reaches quorum.
    pub stop_on_quorum: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            strategy_override: None,
            max_agents: 3,
            per_agent_timeout: Duration::from_secs(30),
            complexity: 0.5,
            experimental: false,
            max_rounds: None,
            stop_on_quorum: false,
        }
    }
}

impl LoopOptions {
    // ==================== Builder Methods ====================

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy_override = Some(strategy);
        self
    }

    pub fn with_max_agents(mut self, max: usize) -> Self {
        self.max_agents = max;
        self
    }

    pub fn with_per_agent_timeout(mut self, timeout: Duration) -> Self {
        self.per_agent_timeout = timeout;
        self
    }

    pub fn with_complexity(mut self, complexity: f64) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_experimental(mut self, experimental: bool) -> Self {
        self.experimental = experimental;
        self
    }

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    pub fn with_stop_on_quorum(mut self, stop: bool) -> Self {
        self.stop_on_quorum = stop;
        self
    }
}
