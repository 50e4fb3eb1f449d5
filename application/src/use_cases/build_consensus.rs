//! Build Consensus use case
//!
//! Runs the voting sub-round over the candidates of a round and resolves
//! the winner. Every leased agent is asked to vote, including agents whose
//! answer failed. A voter whose request fails or times out casts no ballot;
//! an unreadable ballot degrades to candidate 0 at neutral confidence.

use crate::ports::agent_gateway::AgentGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier, RoundPhase};
use crate::use_cases::shared::check_cancelled;
use council_domain::{
    Agent, AgentId, ConsensusProcess, ConsensusResult, ConsensusRule, CouncilError, PromptTemplate,
    RoundReport, TaskLoopId, Vote, parse_ballot,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Resolved consensus plus the per-voter bookkeeping the loop needs.
#[derive(Debug, Clone)]
pub struct ConsensusOutput {
    pub result: ConsensusResult,
    /// `(voter, voted_for_winner)` for every ballot cast
    pub alignment: Vec<(AgentId, bool)>,
    /// Ballots that could not be parsed and fell back to defaults
    pub degraded_ballots: usize,
}

impl ConsensusOutput {
    /// Share of ballots that picked the winner
    pub fn voter_accuracy(&self) -> Option<f64> {
        if self.alignment.is_empty() {
            None
        } else {
            let correct = self.alignment.iter().filter(|(_, ok)| *ok).count();
            Some(correct as f64 / self.alignment.len() as f64)
        }
    }
}

/// Use case for the voting and resolving phases of one round
pub struct BuildConsensusUseCase<G: AgentGateway + 'static> {
    gateway: Arc<G>,
    cancellation_token: Option<CancellationToken>,
}

impl<G: AgentGateway + 'static> BuildConsensusUseCase<G> {
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
        description: &str,
        report: &RoundReport,
        voters: &[Agent],
        rule: ConsensusRule,
        voting_timeout: Duration,
    ) -> Result<ConsensusOutput, CouncilError> {
        self.execute_with_progress(
            loop_id,
            description,
            report,
            voters,
            rule,
            voting_timeout,
            &NoProgress,
        )
        .await
    }

    /// Execute with progress callbacks
    #[allow(clippy::too_many_arguments)]
    pub async fn execute_with_progress(
        &self,
        loop_id: TaskLoopId,
        description: &str,
        report: &RoundReport,
        voters: &[Agent],
        rule: ConsensusRule,
        voting_timeout: Duration,
        progress: &dyn ProgressNotifier,
    ) -> Result<ConsensusOutput, CouncilError> {
        check_cancelled(&self.cancellation_token)?;

        let mut process = ConsensusProcess::collect(&report.responses, rule);
        let mut degraded_ballots = 0;

        if process.needs_ballots() && !voters.is_empty() {
            let candidates: Vec<&str> = process
                .candidates()
                .iter()
                .map(|c| c.content.as_str())
                .collect();
            let candidate_count = candidates.len();
            let prompt = PromptTemplate::ballot_prompt(description, &candidates);

            info!(
                "{}: {} voters choosing among {} candidates",
                loop_id,
                voters.len(),
                candidate_count
            );
            progress.on_phase_start(loop_id, RoundPhase::Voting, voters.len());

            let mut join_set = JoinSet::new();
            for voter in voters {
                let gateway = Arc::clone(&self.gateway);
                let voter_id = voter.id.clone();
                let weight = voter.vote_weight;
                let prompt = prompt.clone();

                join_set.spawn(async move {
                    let result = tokio::time::timeout(
                        voting_timeout,
                        gateway.invoke(&voter_id, &prompt, voting_timeout),
                    )
                    .await;
                    let answer = match result {
                        Ok(Ok(reply)) => Ok(reply.content),
                        Ok(Err(e)) => Err(e.to_string()),
                        Err(_) => Err(format!(
                            "vote timed out after {}ms",
                            voting_timeout.as_millis()
                        )),
                    };
                    (voter_id, weight, answer)
                });
            }

            loop {
                let result = if let Some(ref token) = self.cancellation_token {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            join_set.abort_all();
                            return Err(CouncilError::Cancelled);
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
                    Ok((voter_id, weight, Ok(content))) => {
                        let ballot = parse_ballot(&content, candidate_count);
                        if ballot.degraded {
                            debug!("Ballot from {} unreadable, using defaults", voter_id);
                            degraded_ballots += 1;
                        }
                        progress.on_task_complete(loop_id, RoundPhase::Voting, &voter_id, true);
                        process.cast(Vote::new(
                            voter_id,
                            ballot.selected_index,
                            ballot.confidence,
                            weight,
                        ));
                    }
                    Ok((voter_id, _, Err(e))) => {
                        warn!("Voter {} cast no ballot: {}", voter_id, e);
                        progress.on_task_complete(loop_id, RoundPhase::Voting, &voter_id, false);
                    }
                    Err(e) => {
                        warn!("Task join error: {}", e);
                    }
                }
            }

            progress.on_phase_complete(loop_id, RoundPhase::Voting);
        }

        let result = process.resolve();
        let alignment = process.ballot_alignment(&result);

        info!(
            "{}: consensus {} at {:.1}% ({}, quorum: {})",
            loop_id,
            result
                .winner_agent_id
                .as_ref()
                .map(|id| id.as_str())
                .unwrap_or("none"),
            result.confidence_percent,
            result.strategy_used,
            result.has_quorum
        );

        Ok(ConsensusOutput {
            result,
            alignment,
            degraded_ballots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{Behavior, ScriptedGateway, agent, answer, ballot};
    use council_domain::{AgentResponse, VotingMethod};

    const LOOP: TaskLoopId = TaskLoopId::new(1);

    fn report(answers: &[(&str, bool)]) -> RoundReport {
        let responses = answers
            .iter()
            .map(|(id, ok)| {
                if *ok {
                    AgentResponse::success(AgentId::new(*id), format!("answer from {}", id), 10)
                } else {
                    AgentResponse::failure(AgentId::new(*id), "boom", 10)
                }
            })
            .collect::<Vec<_>>();
        let attempted = responses.len();
        RoundReport::new(responses, attempted, 10)
    }

    fn voters(ids: &[&str]) -> Vec<Agent> {
        ids.iter().map(|id| agent(id)).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_weighted_scenario() {
        let gateway = ScriptedGateway::new()
            .on_ballot("a", ballot(1, 8))
            .on_ballot("b", ballot(1, 8))
            .on_ballot("c", ballot(1, 8))
            .on_ballot("d", ballot(2, 10))
            .on_ballot("e", ballot(2, 10));
        let use_case = BuildConsensusUseCase::new(Arc::new(gateway));

        let output = use_case
            .execute(
                LOOP,
                "task",
                &report(&[("a", true), ("b", true), ("c", false), ("d", false), ("e", false)]),
                &voters(&["a", "b", "c", "d", "e"]),
                ConsensusRule::weighted(0.6),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        let result = &output.result;
        assert_eq!(result.winning_index, Some(0));
        assert_eq!(result.winner_agent_id, Some(AgentId::new("a")));
        assert!((result.confidence_percent - 2.4 / 4.4 * 100.0).abs() < 1e-9);
        assert!(!result.has_quorum);
        assert_eq!(result.strategy_used, VotingMethod::Weighted);
        assert_eq!(output.voter_accuracy(), Some(0.6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_voters_cast_no_ballot() {
        let gateway = ScriptedGateway::new()
            .on_ballot("a", ballot(2, 9))
            .on_ballot("b", Behavior::Fail("connection reset".into()))
            .on_ballot("c", Behavior::Hang);
        let use_case = BuildConsensusUseCase::new(Arc::new(gateway));

        let output = use_case
            .execute(
                LOOP,
                "task",
                &report(&[("a", true), ("b", true), ("c", true)]),
                &voters(&["a", "b", "c"]),
                ConsensusRule::simple(0.6),
                Duration::from_millis(200),
            )
            .await
            .unwrap();

        assert_eq!(output.result.total_votes, 1);
        assert_eq!(output.result.winning_index, Some(1));
        assert_eq!(output.result.confidence_percent, 100.0);
        assert_eq!(output.alignment, vec![(AgentId::new("a"), true)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreadable_ballots_degrade() {
        let gateway = ScriptedGateway::new()
            .on_ballot("a", answer("I like them all"))
            .on_ballot("b", ballot(7, 9));
        let use_case = BuildConsensusUseCase::new(Arc::new(gateway));

        let output = use_case
            .execute(
                LOOP,
                "task",
                &report(&[("a", true), ("b", true)]),
                &voters(&["a", "b"]),
                ConsensusRule::weighted(0.6),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(output.degraded_ballots, 2);
        assert_eq!(output.result.winning_index, Some(0));
        assert_eq!(output.result.vote_counts, vec![2, 0]);
    }

    #[tokio::test]
    async fn test_single_candidate_skips_voting() {
        let gateway = Arc::new(ScriptedGateway::new());
        let use_case = BuildConsensusUseCase::new(Arc::clone(&gateway));

        let output = use_case
            .execute(
                LOOP,
                "task",
                &report(&[("a", true), ("b", false)]),
                &voters(&["a", "b"]),
                ConsensusRule::default(),
                Duration::from_secs(1),
            )
            .await
            .unwrap();

        assert_eq!(gateway.ballot_calls(), 0);
        assert_eq!(output.result.confidence_percent, 100.0);
        assert!(output.result.has_quorum);
        assert!(output.voter_accuracy().is_none());
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let use_case = BuildConsensusUseCase::new(Arc::new(ScriptedGateway::new()));
        let output = use_case
            .execute(
                LOOP,
                "task",
                &report(&[("a", false)]),
                &voters(&["a"]),
                ConsensusRule::default(),
                Duration::from_secs(1),
            )
            .await
            .unwrap();
        assert!(!output.result.has_quorum);
        assert_eq!(output.result.confidence_percent, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tie_winner_does_not_depend_on_latency() {
        use crate::use_cases::run_round::RunRoundUseCase;

        for (a_delay, b_delay) in [(10, 50), (50, 10)] {
            let gateway = Arc::new(
                ScriptedGateway::new()
                    .on_task("a", Behavior::Answer("A".into(), a_delay))
                    .on_task("b", Behavior::Answer("B".into(), b_delay))
                    .on_ballot("a", ballot(1, 7))
                    .on_ballot("b", ballot(2, 7)),
            );
            let round_agents = voters(&["a", "b"]);

            let report = RunRoundUseCase::new(Arc::clone(&gateway))
                .execute(LOOP, "task", &round_agents, Duration::from_secs(1))
                .await
                .unwrap();
            let output = BuildConsensusUseCase::new(gateway)
                .execute(
                    LOOP,
                    "task",
                    &report,
                    &round_agents,
                    ConsensusRule::weighted(0.6),
                    Duration::from_secs(1),
                )
                .await
                .unwrap();

            assert_eq!(output.result.winning_index, Some(0));
            assert_eq!(output.result.winning_content, "A");
            assert_eq!(output.result.winner_agent_id, Some(AgentId::new("a")));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tie_break_is_deterministic() {
        for _ in 0..5 {
            let gateway = ScriptedGateway::new()
                .on_ballot("a", ballot(2, 6))
                .on_ballot("b", ballot(1, 6));
            let use_case = BuildConsensusUseCase::new(Arc::new(gateway));
            let output = use_case
                .execute(
                    LOOP,
                    "task",
                    &report(&[("a", true), ("b", true)]),
                    &voters(&["a", "b"]),
                    ConsensusRule::weighted(0.6),
                    Duration::from_secs(1),
                )
                .await
                .unwrap();
            assert_eq!(output.result.winning_index, Some(0));
            assert_eq!(output.result.confidence_percent, 50.0);
        }
    }
}
