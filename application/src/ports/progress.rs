//! Progress notification port
//!
//! Defines the interface for reporting progress while task loops run.

use council_domain::{AgentId, ConsensusResult, ErrorKind, StrategyKind, TaskLoopId};
use std::time::Duration;

/// Phase of a round as seen by progress reporters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Selected agents answer the task
    Response,
    /// Agents vote on the candidate answers
    Voting,
}

impl RoundPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundPhase::Response => "response",
            RoundPhase::Voting => "voting",
        }
    }
}

/// Callback for progress updates during task loops
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, JSON logs, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a phase starts
    fn on_phase_start(&self, loop_id: TaskLoopId, phase: RoundPhase, total_tasks: usize);

    /// Called when one agent finishes within a phase
    fn on_task_complete(&self, loop_id: TaskLoopId, phase: RoundPhase, agent: &AgentId, success: bool);

    /// Called when a phase completes
    fn on_phase_complete(&self, loop_id: TaskLoopId, phase: RoundPhase);

    // ==================== Loop Callbacks ====================

    /// Called when a round starts.
    fn on_round_start(&self, _loop_id: TaskLoopId, _iteration: u32, _strategy: StrategyKind) {}

    /// Called when a round resolves its consensus.
    fn on_consensus(&self, _loop_id: TaskLoopId, _iteration: u32, _result: &ConsensusResult) {}

    /// Called when a failed round is scheduled for retry.
    fn on_retry_scheduled(&self, _loop_id: TaskLoopId, _kind: ErrorKind, _delay: Duration) {}

    /// Called when the next round is scheduled.
    fn on_next_round(&self, _loop_id: TaskLoopId, _delay: Duration) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_phase_start(&self, _loop_id: TaskLoopId, _phase: RoundPhase, _total_tasks: usize) {}
    fn on_task_complete(&self, _loop_id: TaskLoopId, _phase: RoundPhase, _agent: &AgentId, _success: bool) {}
    fn on_phase_complete(&self, _loop_id: TaskLoopId, _phase: RoundPhase) {}
}
