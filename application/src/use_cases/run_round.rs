//! Run Round use case
//!
//! Fans one prompt out to every leased agent in parallel. Each agent races
//! its own deadline; the round waits for all races to settle and never fails
//! fast. Only a round where nobody answered is an error.

use crate::ports::agent_gateway::AgentGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier, RoundPhase};
use crate::use_cases::shared::{check_cancelled, elapsed_ms};
use council_domain::core::string::{single_line, truncate};
use council_domain::{Agent, AgentResponse, CouncilError, ErrorKind, RoundReport, TaskLoopId};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that end a round early
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RunRoundError {
    #[error("Operation cancelled")]
    Cancelled,

    #[error("All {} agents failed to respond", .0.attempted)]
    AllAgentsFailed(RoundReport),
}

impl RunRoundError {
    /// Domain error for this failure
    pub fn to_council_error(&self) -> CouncilError {
        match self {
            RunRoundError::Cancelled => CouncilError::Cancelled,
            RunRoundError::AllAgentsFailed(report) => CouncilError::AllAgentsFailed {
                attempted: report.attempted,
            },
        }
    }

    /// Classify the failure from the first agent error of the round.
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            RunRoundError::Cancelled => ErrorKind::Unknown,
            RunRoundError::AllAgentsFailed(report) => report
                .first_error()
                .map(ErrorKind::classify)
                .unwrap_or(ErrorKind::Unknown),
        }
    }
}

/// Use case for running the response phase of one round
pub struct RunRoundUseCase<G: AgentGateway + 'static> {
    gateway: Arc<G>,
    cancellation_token: Option<CancellationToken>,
}

impl<G: AgentGateway + 'static> RunRoundUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            cancellation_token: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute with default (no-op) progress
    pub async fn execute(
        &self,
        loop_id: TaskLoopId,
        prompt: &str,
        agents: &[Agent],
        per_agent_timeout: Duration,
    ) -> Result<RoundReport, RunRoundError> {
        self.execute_with_progress(loop_id, prompt, agents, per_agent_timeout, &NoProgress)
            .await
    }

    /// Execute with progress callbacks
    ///
    /// Responses are kept in the order of `agents`, whatever order they
    /// arrive in, so candidate numbering never depends on latency.
    pub async fn execute_with_progress(
        &self,
        loop_id: TaskLoopId,
        prompt: &str,
        agents: &[Agent],
        per_agent_timeout: Duration,
        progress: &dyn ProgressNotifier,
    ) -> Result<RoundReport, RunRoundError> {
        check_cancelled(&self.cancellation_token).map_err(|_| RunRoundError::Cancelled)?;

        info!(
            "{}: asking {} agents (timeout {}ms)",
            loop_id,
            agents.len(),
            per_agent_timeout.as_millis()
        );
        progress.on_phase_start(loop_id, RoundPhase::Response, agents.len());

        let start = Instant::now();
        let mut join_set = JoinSet::new();

        for (slot, agent) in agents.iter().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let agent_id = agent.id.clone();
            let prompt = prompt.to_string();

            join_set.spawn(async move {
                let started = Instant::now();
                let result = tokio::time::timeout(
                    per_agent_timeout,
                    gateway.invoke(&agent_id, &prompt, per_agent_timeout),
                )
                .await;

                let response = match result {
                    Ok(Ok(reply)) if reply.content.trim().is_empty() => {
                        AgentResponse::failure(agent_id, "empty response", elapsed_ms(started))
                    }
                    Ok(Ok(reply)) => {
                        AgentResponse::success(agent_id, reply.content, elapsed_ms(started))
                    }
                    Ok(Err(e)) => AgentResponse::failure(agent_id, e.to_string(), elapsed_ms(started)),
                    Err(_) => AgentResponse::timeout(agent_id, per_agent_timeout.as_millis() as u64),
                };
                (slot, response)
            });
        }

        let mut slots: Vec<Option<AgentResponse>> = vec![None; agents.len()];

        loop {
            let result = if let Some(ref token) = self.cancellation_token {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        join_set.abort_all();
                        return Err(RunRoundError::Cancelled);
                    }
                    result = join_set.join_next() => result,
                }
            } else {
                join_set.join_next().await
            };

            let Some(result) = result else {
                break;
            };

            match result {
                Ok((slot, response)) => {
                    if response.succeeded {
                        debug!(
                            "Agent {} answered in {}ms: {}",
                            response.agent_id,
                            response.latency_ms,
                            truncate(&single_line(&response.content), 80)
                        );
                    } else {
                        warn!(
                            "Agent {} failed: {}",
                            response.agent_id,
                            response.error.as_deref().unwrap_or("unknown error")
                        );
                    }
                    progress.on_task_complete(
                        loop_id,
                        RoundPhase::Response,
                        &response.agent_id,
                        response.succeeded,
                    );
                    slots[slot] = Some(response);
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        progress.on_phase_complete(loop_id, RoundPhase::Response);

        let responses: Vec<AgentResponse> = slots.into_iter().flatten().collect();
        let report = RoundReport::new(responses, agents.len(), elapsed_ms(start));
        info!(
            "{}: {}/{} agents answered ({} timed out) in {}ms",
            loop_id,
            report.success_count(),
            report.attempted,
            report.timeout_count(),
            report.duration_ms
        );

        if report.all_failed() {
            return Err(RunRoundError::AllAgentsFailed(report));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{Behavior, ScriptedGateway, agent, answer};

    const LOOP: TaskLoopId = TaskLoopId::new(1);

    fn agents(ids: &[&str]) -> Vec<Agent> {
        ids.iter().map(|id| agent(id)).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_is_tolerated() {
        let gateway = ScriptedGateway::new()
            .on_task("a", answer("A"))
            .on_task("b", Behavior::Fail("503 Service Unavailable".into()))
            .on_task("c", Behavior::Hang)
            .on_task("d", answer("D"));
        let use_case = RunRoundUseCase::new(Arc::new(gateway));

        let report = use_case
            .execute(LOOP, "task", &agents(&["a", "b", "c", "d"]), Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(report.attempted, 4);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 2);
        assert_eq!(report.timeout_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_bounded_by_timeout_not_agent_count() {
        let mut gateway = ScriptedGateway::new();
        let ids: Vec<String> = (0..20).map(|i| format!("slow-{}", i)).collect();
        for id in &ids {
            gateway = gateway.on_task(id, Behavior::Hang);
        }
        gateway = gateway.on_task("fast", answer("ok"));
        let use_case = RunRoundUseCase::new(Arc::new(gateway));

        let mut round_agents: Vec<Agent> = ids.iter().map(|id| agent(id)).collect();
        round_agents.push(agent("fast"));

        let timeout = Duration::from_millis(500);
        let start = Instant::now();
        let report = use_case
            .execute(LOOP, "task", &round_agents, timeout)
            .await
            .unwrap();

        assert!(start.elapsed() <= timeout + Duration::from_millis(50));
        assert_eq!(report.success_count(), 1);
        assert_eq!(report.timeout_count(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failed_is_an_error_with_report() {
        let gateway = ScriptedGateway::new()
            .on_task("a", Behavior::Fail("429 Too Many Requests".into()))
            .on_task("b", Behavior::Fail("429 Too Many Requests".into()));
        let use_case = RunRoundUseCase::new(Arc::new(gateway));

        let err = use_case
            .execute(LOOP, "task", &agents(&["a", "b"]), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert_eq!(err.to_council_error(), CouncilError::AllAgentsFailed { attempted: 2 });
        assert_eq!(err.error_kind(), ErrorKind::RateLimit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_responses_keep_agent_order_regardless_of_latency() {
        for (a_delay, b_delay) in [(10, 50), (50, 10)] {
            let gateway = ScriptedGateway::new()
                .on_task("a", Behavior::Answer("A".into(), a_delay))
                .on_task("b", Behavior::Answer("B".into(), b_delay))
                .on_task("c", Behavior::Fail("503 Service Unavailable".into()));
            let use_case = RunRoundUseCase::new(Arc::new(gateway));

            let report = use_case
                .execute(LOOP, "task", &agents(&["a", "b", "c"]), Duration::from_secs(1))
                .await
                .unwrap();

            let order: Vec<&str> = report.responses.iter().map(|r| r.agent_id.as_str()).collect();
            assert_eq!(order, vec!["a", "b", "c"]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_answer_counts_as_failure() {
        let gateway = ScriptedGateway::new()
            .on_task("a", answer("   "))
            .on_task("b", answer("real"));
        let use_case = RunRoundUseCase::new(Arc::new(gateway));

        let report = use_case
            .execute(LOOP, "task", &agents(&["a", "b"]), Duration::from_secs(1))
            .await
            .unwrap();
        let successful: Vec<&str> = report.successful().map(|r| r.agent_id.as_str()).collect();
        assert_eq!(successful, vec!["b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_preempts_wait() {
        let gateway = ScriptedGateway::new().on_task("a", Behavior::Hang);
        let token = CancellationToken::new();
        let use_case = RunRoundUseCase::new(Arc::new(gateway)).with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            token.cancel();
        });

        let start = Instant::now();
        let err = use_case
            .execute(LOOP, "task", &agents(&["a"]), Duration::from_secs(60))
            .await
            .unwrap_err();

        assert_eq!(err, RunRoundError::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(1));
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let use_case =
            RunRoundUseCase::new(Arc::new(ScriptedGateway::new())).with_cancellation(token);
        let err = use_case
            .execute(LOOP, "task", &agents(&["a"]), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert_eq!(err, RunRoundError::Cancelled);
    }
}
