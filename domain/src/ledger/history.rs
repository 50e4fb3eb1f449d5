//! Performance ledger
//!
//! Bounded, append-only history of [`RoundOutcome`]s per task loop. The
//! ledger is the only writer of outcomes; the scheduler reads window
//! statistics from it to pick strategies and intervals.

use super::entities::RoundOutcome;
use crate::task::TaskLoopId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Default number of outcomes kept per task loop
pub const DEFAULT_LEDGER_CAPACITY: usize = 100;

/// Direction quality has moved over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    #[default]
    Stable,
    Declining,
}

/// Minimum change in mean quality between window halves to count as a trend
const TREND_EPSILON: f64 = 0.05;

/// Summary statistics over the most recent outcomes of one loop.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowStats {
    pub count: usize,
    pub mean_quality: f64,
    /// `max - min` quality in the window
    pub quality_spread: f64,
    pub mean_performance: f64,
    pub mean_duration_ms: f64,
    pub failure_rate: f64,
    pub trend: Trend,
}

impl WindowStats {
    /// Statistics over `outcomes` (oldest first).
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = &'a RoundOutcome>,
    {
        let outcomes: Vec<&RoundOutcome> = outcomes.into_iter().collect();
        if outcomes.is_empty() {
            return Self::default();
        }

        let n = outcomes.len() as f64;
        let qualities: Vec<f64> = outcomes.iter().map(|o| o.quality).collect();
        let max = qualities.iter().copied().fold(f64::MIN, f64::max);
        let min = qualities.iter().copied().fold(f64::MAX, f64::min);

        Self {
            count: outcomes.len(),
            mean_quality: qualities.iter().sum::<f64>() / n,
            quality_spread: max - min,
            mean_performance: outcomes.iter().map(|o| o.performance).sum::<f64>() / n,
            mean_duration_ms: outcomes.iter().map(|o| o.duration_ms as f64).sum::<f64>() / n,
            failure_rate: outcomes.iter().filter(|o| !o.succeeded).count() as f64 / n,
            trend: trend_of(&qualities),
        }
    }
}

fn trend_of(qualities: &[f64]) -> Trend {
    if qualities.len() < 2 {
        return Trend::Stable;
    }
    let mid = qualities.len() / 2;
    let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
    let delta = mean(&qualities[mid..]) - mean(&qualities[..mid]);
    if delta > TREND_EPSILON {
        Trend::Improving
    } else if delta < -TREND_EPSILON {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

#[derive(Debug, Clone)]
pub struct PerformanceLedger {
    capacity: usize,
    loops: HashMap<TaskLoopId, VecDeque<RoundOutcome>>,
}

impl Default for PerformanceLedger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_CAPACITY)
    }
}

impl PerformanceLedger {
    /// Create a ledger keeping at most `capacity` outcomes per loop (min 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            loops: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an outcome, evicting the oldest entry of its loop when full.
    pub fn record(&mut self, outcome: RoundOutcome) {
        let history = self.loops.entry(outcome.task_loop_id).or_default();
        if history.len() == self.capacity {
            history.pop_front();
        }
        history.push_back(outcome);
    }

    /// Outcomes of a loop, oldest first.
    pub fn history(&self, id: TaskLoopId) -> Vec<RoundOutcome> {
        self.loops
            .get(&id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn latest(&self, id: TaskLoopId) -> Option<&RoundOutcome> {
        self.loops.get(&id).and_then(|h| h.back())
    }

    pub fn len(&self, id: TaskLoopId) -> usize {
        self.loops.get(&id).map_or(0, VecDeque::len)
    }

    /// Statistics over the last `window` outcomes of a loop.
    pub fn window(&self, id: TaskLoopId, window: usize) -> WindowStats {
        match self.loops.get(&id) {
            Some(history) => {
                let skip = history.len().saturating_sub(window);
                WindowStats::from_outcomes(history.iter().skip(skip))
            }
            None => WindowStats::default(),
        }
    }

    /// Loops with at least one recorded outcome.
    pub fn loop_ids(&self) -> Vec<TaskLoopId> {
        let mut ids: Vec<TaskLoopId> = self.loops.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Highest loop id seen, used to resume numbering after a replay.
    pub fn max_loop_id(&self) -> Option<TaskLoopId> {
        self.loops.keys().copied().max()
    }

    /// Drop every outcome of a loop. Returns how many were removed.
    pub fn forget(&mut self, id: TaskLoopId) -> usize {
        self.loops.remove(&id).map_or(0, |h| h.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(loop_id: u64, iteration: u32, quality: f64) -> RoundOutcome {
        RoundOutcome {
            task_loop_id: TaskLoopId::new(loop_id),
            iteration,
            quality,
            duration_ms: 1_000,
            cost_estimate: 1.0,
            performance: quality,
            voter_accuracy: None,
            failed_agents: 0,
            succeeded: quality > 0.0,
            timestamp: 0,
        }
    }

    #[test]
    fn test_ring_buffer_evicts_oldest() {
        let mut ledger = PerformanceLedger::new(3);
        for i in 0..5 {
            ledger.record(outcome(1, i, 0.5));
        }
        let history = ledger.history(TaskLoopId::new(1));
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].iteration, 2);
        assert_eq!(ledger.latest(TaskLoopId::new(1)).map(|o| o.iteration), Some(4));
    }

    #[test]
    fn test_loops_are_independent() {
        let mut ledger = PerformanceLedger::new(10);
        ledger.record(outcome(1, 0, 0.5));
        ledger.record(outcome(2, 0, 0.9));
        ledger.record(outcome(2, 1, 0.9));
        assert_eq!(ledger.len(TaskLoopId::new(1)), 1);
        assert_eq!(ledger.len(TaskLoopId::new(2)), 2);
        assert_eq!(ledger.loop_ids(), vec![TaskLoopId::new(1), TaskLoopId::new(2)]);
        assert_eq!(ledger.max_loop_id(), Some(TaskLoopId::new(2)));
    }

    #[test]
    fn test_window_stats() {
        let mut ledger = PerformanceLedger::default();
        for (i, q) in [0.1, 0.2, 0.6, 0.8, 1.0].into_iter().enumerate() {
            ledger.record(outcome(7, i as u32, q));
        }
        let stats = ledger.window(TaskLoopId::new(7), 3);
        assert_eq!(stats.count, 3);
        assert!((stats.mean_quality - 0.8).abs() < 1e-9);
        assert!((stats.quality_spread - 0.4).abs() < 1e-9);
        assert_eq!(stats.trend, Trend::Improving);
        assert_eq!(stats.failure_rate, 0.0);
    }

    #[test]
    fn test_declining_trend_and_failures() {
        let stats =
            WindowStats::from_outcomes(&[outcome(1, 0, 0.9), outcome(1, 1, 0.9), outcome(1, 2, 0.0)]);
        assert_eq!(stats.trend, Trend::Declining);
        assert!((stats.failure_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_window() {
        let ledger = PerformanceLedger::default();
        assert_eq!(ledger.window(TaskLoopId::new(1), 5), WindowStats::default());
        assert!(ledger.history(TaskLoopId::new(1)).is_empty());
    }

    #[test]
    fn test_forget_drops_only_that_loop() {
        let mut ledger = PerformanceLedger::default();
        ledger.record(outcome(1, 0, 0.5));
        ledger.record(outcome(1, 1, 0.5));
        ledger.record(outcome(2, 0, 0.5));

        assert_eq!(ledger.forget(TaskLoopId::new(1)), 2);
        assert!(ledger.history(TaskLoopId::new(1)).is_empty());
        assert_eq!(ledger.len(TaskLoopId::new(2)), 1);
        assert_eq!(ledger.forget(TaskLoopId::new(1)), 0);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut ledger = PerformanceLedger::new(0);
        ledger.record(outcome(1, 0, 0.5));
        ledger.record(outcome(1, 1, 0.5));
        assert_eq!(ledger.len(TaskLoopId::new(1)), 1);
    }
}
