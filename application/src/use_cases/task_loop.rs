//! Task loop
//!
//! One task loop runs successive rounds for a single task:
//!
//! ```text
//! SelectStrategy ──► RunRound ──┬──► ScheduleNext ───┐
//!       ▲                       └──► ScheduleRetry ──┤
//!       └────────────── sleep (cancellable) ◄────────┘
//! ```
//!
//! Rounds are strictly sequential. The loop ends when it is stopped, reaches
//! `max_rounds`, reaches quorum with `stop_on_quorum`, or exhausts
//! `max_consecutive_errors`.

use crate::config::{EngineConfig, LoopOptions};
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::progress::ProgressNotifier;
use crate::ports::resources::{JitterSource, ResourceSnapshotProvider};
use crate::ports::state_journal::{JournalEntry, StateJournal};
use crate::use_cases::build_consensus::{BuildConsensusUseCase, ConsensusOutput};
use crate::use_cases::run_round::{RunRoundError, RunRoundUseCase};
use crate::use_cases::shared::{elapsed_ms, lock};
use council_domain::ledger::{performance_score, round_quality};
use council_domain::scheduling::RecoveryAction;
use council_domain::util::current_timestamp_ms;
use council_domain::{
    AgentId, AgentRegistry, ConsensusResult, CouncilError, ErrorKind, IntervalSignals,
    LoopContext, PerformanceLedger, PromptTemplate, RoundOutcome, StrategyKind, Task, TaskId,
    TaskLoopId, compute_next_interval, compute_retry_interval, select_strategy,
};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Lifecycle state of a task loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopState {
    /// Submitted, first round not started yet
    Pending,
    /// A round is in flight
    Running,
    /// Sleeping until the next round
    Waiting,
    /// Sleeping before retrying a failed round
    Retrying,
    /// Reached `max_rounds` or quorum
    Completed,
    /// Stopped by request or shutdown
    Stopped,
    /// Too many consecutive failed rounds
    Failed,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoopState::Completed | LoopState::Stopped | LoopState::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoopState::Pending => "pending",
            LoopState::Running => "running",
            LoopState::Waiting => "waiting",
            LoopState::Retrying => "retrying",
            LoopState::Completed => "completed",
            LoopState::Stopped => "stopped",
            LoopState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for LoopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observable status of a task loop, published on every transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoopStatus {
    pub loop_id: TaskLoopId,
    pub task_id: TaskId,
    /// Successful rounds so far
    pub iteration: u32,
    pub state: LoopState,
    pub current_strategy: Option<StrategyKind>,
    pub last_consensus: Option<ConsensusResult>,
    /// Delay until the next round while waiting or retrying
    pub next_round_eta_ms: Option<u64>,
    /// When the pending timer fires
    #[serde(skip)]
    pub next_round_at: Option<Instant>,
    pub consecutive_errors: u32,
    pub last_error: Option<String>,
    pub last_error_kind: Option<ErrorKind>,
    /// Recovery actions suggested for the last failure
    pub recovery_actions: Vec<RecoveryAction>,
    /// Agents the next round will lease
    pub agent_budget: usize,
}

impl LoopStatus {
    pub fn new(loop_id: TaskLoopId, task_id: TaskId, agent_budget: usize) -> Self {
        Self {
            loop_id,
            task_id,
            iteration: 0,
            state: LoopState::Pending,
            current_strategy: None,
            last_consensus: None,
            next_round_eta_ms: None,
            next_round_at: None,
            consecutive_errors: 0,
            last_error: None,
            last_error_kind: None,
            recovery_actions: Vec::new(),
            agent_budget,
        }
    }

    /// Copy with `next_round_eta_ms` counted down to `now`.
    pub fn remaining_at(&self, now: Instant) -> Self {
        let mut status = self.clone();
        if let Some(at) = self.next_round_at {
            status.next_round_eta_ms = Some(at.saturating_duration_since(now).as_millis() as u64);
        }
        status
    }
}

/// Agents leased to one round. Dropping the lease returns them to the pool,
/// including when the round is cancelled mid-flight.
pub(crate) struct AgentLease {
    registry: Arc<Mutex<AgentRegistry>>,
    ids: Vec<AgentId>,
}

impl AgentLease {
    pub(crate) fn new(registry: Arc<Mutex<AgentRegistry>>, ids: Vec<AgentId>) -> Self {
        Self { registry, ids }
    }
}

impl Drop for AgentLease {
    fn drop(&mut self) {
        lock(&self.registry).release(&self.ids);
        debug!("Released {} agents", self.ids.len());
    }
}

/// State shared by the engine and all of its loops.
pub(crate) struct EngineShared<G: AgentGateway + 'static> {
    pub(crate) gateway: Arc<G>,
    pub(crate) registry: Arc<Mutex<AgentRegistry>>,
    pub(crate) ledger: Mutex<PerformanceLedger>,
    pub(crate) config: EngineConfig,
    pub(crate) progress: Arc<dyn ProgressNotifier>,
    pub(crate) journal: Arc<dyn StateJournal>,
    pub(crate) resources: Arc<dyn ResourceSnapshotProvider>,
    pub(crate) jitter: Arc<dyn JitterSource>,
}

/// A failed round, classified for backoff.
struct RoundFailure {
    error: CouncilError,
    kind: ErrorKind,
    /// Outcome to record when the round actually ran
    outcome: Option<RoundOutcome>,
}

enum RoundError {
    Cancelled,
    Failed(RoundFailure),
}

/// What one successful round produced.
struct RoundSuccess {
    consensus: ConsensusOutput,
    outcome: RoundOutcome,
}

pub(crate) struct TaskLoop<G: AgentGateway + 'static> {
    pub(crate) id: TaskLoopId,
    pub(crate) task: Task,
    pub(crate) options: LoopOptions,
    pub(crate) shared: Arc<EngineShared<G>>,
    pub(crate) token: CancellationToken,
    pub(crate) status: watch::Sender<LoopStatus>,
}

impl<G: AgentGateway + 'static> TaskLoop<G> {
    pub(crate) async fn run(self) {
        let context = LoopContext::new(self.options.complexity, self.options.experimental);
        let mut iteration: u32 = 0;
        let mut consecutive_errors: u32 = 0;
        let mut agent_budget = self.options.max_agents.max(1);

        info!("{}: started for task {}", self.id, self.task.id);

        loop {
            if self.token.is_cancelled() {
                self.finish(LoopState::Stopped);
                return;
            }

            // SelectStrategy
            let strategy = match self.options.strategy_override {
                Some(kind) => kind,
                None => {
                    let history = lock(&self.shared.ledger).history(self.id);
                    let resources = self.shared.resources.snapshot();
                    select_strategy(&context.at_iteration(iteration), &history, &resources)
                }
            };
            self.status.send_modify(|s| {
                s.state = LoopState::Running;
                s.current_strategy = Some(strategy);
                s.next_round_eta_ms = None;
                s.next_round_at = None;
            });
            self.shared
                .progress
                .on_round_start(self.id, iteration + 1, strategy);
            debug!("{}: round {} with {} strategy", self.id, iteration, strategy);

            // RunRound
            let delay = match self.run_round(iteration, strategy, agent_budget).await {
                Ok(round) => {
                    consecutive_errors = 0;
                    iteration += 1;
                    let has_quorum = round.consensus.result.has_quorum;
                    self.record(round.outcome.clone());
                    self.record_ballots(&round.consensus);
                    self.shared
                        .progress
                        .on_consensus(self.id, iteration, &round.consensus.result);
                    self.status.send_modify(|s| {
                        s.iteration = iteration;
                        s.consecutive_errors = 0;
                        s.last_consensus = Some(round.consensus.result.clone());
                    });

                    if self.options.stop_on_quorum && has_quorum {
                        info!("{}: quorum reached after {} rounds", self.id, iteration);
                        self.finish(LoopState::Completed);
                        return;
                    }
                    if self
                        .options
                        .max_rounds
                        .is_some_and(|max| iteration >= max)
                    {
                        info!("{}: completed {} rounds", self.id, iteration);
                        self.finish(LoopState::Completed);
                        return;
                    }

                    // ScheduleNext
                    let signals = IntervalSignals {
                        performance: round.outcome.performance,
                        quality: round.outcome.quality,
                        resource_availability: self.shared.resources.snapshot().availability,
                    };
                    let ms = compute_next_interval(
                        &strategy.timing(),
                        &signals,
                        self.shared.jitter.jitter(),
                        self.shared.config.interval_bounds,
                    );
                    let delay = Duration::from_millis(ms);
                    self.status.send_modify(|s| {
                        s.state = LoopState::Waiting;
                        s.next_round_eta_ms = Some(ms);
                        s.next_round_at = Some(Instant::now() + delay);
                    });
                    self.shared.progress.on_next_round(self.id, delay);
                    debug!("{}: next round in {}ms", self.id, ms);
                    delay
                }
                Err(RoundError::Cancelled) => {
                    self.finish(LoopState::Stopped);
                    return;
                }
                Err(RoundError::Failed(failure)) => {
                    consecutive_errors += 1;
                    if let Some(outcome) = failure.outcome {
                        self.record(outcome);
                    }

                    let actions = failure.kind.recovery_actions();
                    warn!(
                        "{}: round failed ({}, {} in a row): {}",
                        self.id, failure.kind, consecutive_errors, failure.error
                    );

                    if consecutive_errors >= self.shared.config.max_consecutive_errors {
                        warn!(
                            "{}: giving up after {} consecutive errors",
                            self.id, consecutive_errors
                        );
                        self.status.send_modify(|s| {
                            s.consecutive_errors = consecutive_errors;
                            s.last_error = Some(failure.error.to_string());
                            s.last_error_kind = Some(failure.kind);
                            s.recovery_actions = actions.to_vec();
                        });
                        self.finish(LoopState::Failed);
                        return;
                    }

                    if actions.contains(&RecoveryAction::ReduceConcurrency) && agent_budget > 1 {
                        agent_budget -= 1;
                        info!("{}: reducing agents per round to {}", self.id, agent_budget);
                    }

                    // ScheduleRetry
                    let ms = compute_retry_interval(
                        failure.kind,
                        consecutive_errors,
                        self.shared.config.retry_base_ms,
                    );
                    let delay = Duration::from_millis(ms);
                    self.status.send_modify(|s| {
                        s.state = LoopState::Retrying;
                        s.next_round_eta_ms = Some(ms);
                        s.next_round_at = Some(Instant::now() + delay);
                        s.consecutive_errors = consecutive_errors;
                        s.last_error = Some(failure.error.to_string());
                        s.last_error_kind = Some(failure.kind);
                        s.recovery_actions = actions.to_vec();
                        s.agent_budget = agent_budget;
                    });
                    self.shared
                        .progress
                        .on_retry_scheduled(self.id, failure.kind, delay);
                    delay
                }
            };

            tokio::select! {
                biased;
                _ = self.token.cancelled() => {
                    self.finish(LoopState::Stopped);
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn run_round(
        &self,
        iteration: u32,
        strategy: StrategyKind,
        agent_budget: usize,
    ) -> Result<RoundSuccess, RoundError> {
        let start = Instant::now();

        let agents = lock(&self.shared.registry)
            .select(self.task.required_capabilities.as_slice(), agent_budget)
            .map_err(|error| {
                RoundError::Failed(RoundFailure {
                    kind: ErrorKind::of(&error),
                    error,
                    outcome: None,
                })
            })?;
        let _lease = AgentLease::new(
            Arc::clone(&self.shared.registry),
            agents.iter().map(|a| a.id.clone()).collect(),
        );
        let cost_estimate: f64 = agents.iter().map(|a| a.cost_weight).sum();

        let timing = strategy.timing();
        let response_timeout = self.options.per_agent_timeout;
        let voting_timeout = timing.voting_timeout(response_timeout);
        let budget_ms = (response_timeout + voting_timeout).as_millis() as u64;

        let prompt =
            PromptTemplate::task_prompt(&self.task.description, &self.task.required_capabilities);
        let report = RunRoundUseCase::new(Arc::clone(&self.shared.gateway))
            .with_cancellation(self.token.clone())
            .execute_with_progress(
                self.id,
                &prompt,
                &agents,
                response_timeout,
                self.shared.progress.as_ref(),
            )
            .await
            .map_err(|e| match e {
                RunRoundError::Cancelled => RoundError::Cancelled,
                RunRoundError::AllAgentsFailed(ref report) => {
                    let duration_ms = elapsed_ms(start);
                    RoundError::Failed(RoundFailure {
                        error: e.to_council_error(),
                        kind: e.error_kind(),
                        outcome: Some(RoundOutcome {
                            task_loop_id: self.id,
                            iteration,
                            quality: 0.0,
                            duration_ms,
                            cost_estimate,
                            performance: performance_score(0.0, duration_ms, budget_ms),
                            voter_accuracy: None,
                            failed_agents: report.failure_count(),
                            succeeded: false,
                            timestamp: current_timestamp_ms(),
                        }),
                    })
                }
            })?;

        let consensus = BuildConsensusUseCase::new(Arc::clone(&self.shared.gateway))
            .with_cancellation(self.token.clone())
            .execute_with_progress(
                self.id,
                &self.task.description,
                &report,
                &agents,
                self.shared.config.consensus_rule,
                voting_timeout,
                self.shared.progress.as_ref(),
            )
            .await
            .map_err(|_| RoundError::Cancelled)?;

        let duration_ms = elapsed_ms(start);
        let quality = round_quality(consensus.result.confidence_percent, report.participation());
        let outcome = RoundOutcome {
            task_loop_id: self.id,
            iteration,
            quality,
            duration_ms,
            cost_estimate,
            performance: performance_score(quality, duration_ms, budget_ms),
            voter_accuracy: consensus.voter_accuracy(),
            failed_agents: report.failure_count(),
            succeeded: true,
            timestamp: current_timestamp_ms(),
        };

        Ok(RoundSuccess { consensus, outcome })
    }

    fn record(&self, outcome: RoundOutcome) {
        self.shared.journal.append(&JournalEntry::RoundOutcome {
            outcome: outcome.clone(),
        });
        lock(&self.shared.ledger).record(outcome);
    }

    fn record_ballots(&self, consensus: &ConsensusOutput) {
        let updated = lock(&self.shared.registry).record_ballots(&consensus.alignment);
        for (agent_id, success_rate, vote_record) in updated {
            self.shared.journal.append(&JournalEntry::AgentSuccessRate {
                agent_id,
                success_rate,
                vote_record,
            });
        }
    }

    fn finish(&self, state: LoopState) {
        info!("{}: {}", self.id, state);
        self.status.send_modify(|s| {
            s.state = state;
            s.next_round_eta_ms = None;
            s.next_round_at = None;
        });
    }
}
