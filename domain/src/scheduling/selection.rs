//! Strategy selection
//!
//! A deterministic rule table over the loop context, recent history and the
//! current resource snapshot. Rules are checked in order; the first match
//! wins:
//!
//! | # | Condition                                         | Strategy     |
//! |---|---------------------------------------------------|--------------|
//! | 1 | complexity > 0.7 and availability > 0.8           | aggressive   |
//! | 2 | complexity < 0.3 and recent quality > 0.8         | conservative |
//! | 3 | recent quality spread > 0.3                       | adaptive     |
//! | 4 | experimental and availability > 0.9               | experimental |
//! | 5 | otherwise                                         | balanced     |
//!
//! After iteration 10, with at least 5 outcomes, the recent mean quality
//! overrides the table: > 0.8 forces aggressive, < 0.4 forces conservative.

use super::resources::ResourceSnapshot;
use super::strategy::StrategyKind;
use crate::ledger::{RoundOutcome, WindowStats};
use serde::{Deserialize, Serialize};

/// Number of recent outcomes the rules look at
pub const RECENT_WINDOW: usize = 5;
/// Iterations after which history may override the rule table
pub const LEARNING_THRESHOLD: u32 = 10;

/// Per-loop inputs to strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoopContext {
    /// Rounds completed so far
    pub iteration: u32,
    /// Task complexity (0.0 to 1.0)
    pub complexity: f64,
    pub experimental: bool,
}

impl LoopContext {
    pub fn new(complexity: f64, experimental: bool) -> Self {
        Self {
            iteration: 0,
            complexity: if complexity.is_finite() {
                complexity.clamp(0.0, 1.0)
            } else {
                0.5
            },
            experimental,
        }
    }

    pub fn at_iteration(mut self, iteration: u32) -> Self {
        self.iteration = iteration;
        self
    }
}

/// Pick the strategy for the next round.
///
/// `history` is the loop's outcomes, oldest first.
///
/// ```
/// use council_domain::scheduling::{LoopContext, ResourceSnapshot, StrategyKind, select_strategy};
///
/// let ctx = LoopContext::new(0.9, false);
/// let picked = select_strategy(&ctx, &[], &ResourceSnapshot::new(0.95));
/// assert_eq!(picked, StrategyKind::Aggressive);
/// ```
pub fn select_strategy(
    context: &LoopContext,
    history: &[RoundOutcome],
    resources: &ResourceSnapshot,
) -> StrategyKind {
    let skip = history.len().saturating_sub(RECENT_WINDOW);
    let recent = WindowStats::from_outcomes(&history[skip..]);

    if let Some(learned) = learned_override(context, &recent) {
        return learned;
    }

    let availability = resources.availability;
    if context.complexity > 0.7 && availability > 0.8 {
        StrategyKind::Aggressive
    } else if context.complexity < 0.3 && recent.count > 0 && recent.mean_quality > 0.8 {
        StrategyKind::Conservative
    } else if recent.quality_spread > 0.3 {
        StrategyKind::Adaptive
    } else if context.experimental && availability > 0.9 {
        StrategyKind::Experimental
    } else {
        StrategyKind::Balanced
    }
}

fn learned_override(context: &LoopContext, recent: &WindowStats) -> Option<StrategyKind> {
    if context.iteration <= LEARNING_THRESHOLD || recent.count < RECENT_WINDOW {
        return None;
    }
    if recent.mean_quality > 0.8 {
        Some(StrategyKind::Aggressive)
    } else if recent.mean_quality < 0.4 {
        Some(StrategyKind::Conservative)
    } else {
        None
    }
}
