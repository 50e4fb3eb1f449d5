//! Ledger entries

use crate::task::TaskLoopId;
use serde::{Deserialize, Serialize};

/// Weight of consensus confidence in round quality (participation gets the rest)
const CONFIDENCE_SHARE: f64 = 0.7;

/// Outcome of one round of a task loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub task_loop_id: TaskLoopId,
    pub iteration: u32,
    /// Quality of the round (0.0 to 1.0); 0 for failed rounds
    pub quality: f64,
    pub duration_ms: u64,
    /// Sum of the cost weights of the agents leased for the round
    pub cost_estimate: f64,
    /// Combined timeliness and quality (0.0 to 1.0)
    pub performance: f64,
    /// Share of ballots that picked the winner (`None` without ballots)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_accuracy: Option<f64>,
    #[serde(default)]
    pub failed_agents: usize,
    pub succeeded: bool,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

/// Round quality from consensus confidence (0-100) and participation (0-1).
///
/// ```
/// use council_domain::ledger::round_quality;
///
/// assert!((round_quality(100.0, 1.0) - 1.0).abs() < 1e-9);
/// assert!((round_quality(50.0, 0.5) - 0.5).abs() < 1e-9);
/// ```
pub fn round_quality(confidence_percent: f64, participation: f64) -> f64 {
    let confidence = (confidence_percent / 100.0).clamp(0.0, 1.0);
    let participation = participation.clamp(0.0, 1.0);
    CONFIDENCE_SHARE * confidence + (1.0 - CONFIDENCE_SHARE) * participation
}

/// Performance of a round: mean of timeliness and quality.
///
/// Timeliness is `1 - duration / budget`, so a round that used its whole
/// deadline scores 0 on that half.
pub fn performance_score(quality: f64, duration_ms: u64, budget_ms: u64) -> f64 {
    let timeliness = if budget_ms == 0 {
        0.0
    } else {
        (1.0 - duration_ms as f64 / budget_ms as f64).clamp(0.0, 1.0)
    };
    (timeliness + quality.clamp(0.0, 1.0)) / 2.0
}
