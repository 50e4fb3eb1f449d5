//! Consensus resolution
//!
//! A consensus round walks a small state machine:
//!
//! ```text
//! Collecting ──(no candidates)──────────────────────┐
//!     │                                             │
//!     ├──(one candidate)────────────────────────────┤
//!     ▼                                             ▼
//!   Voting ──(ballots cast)──► Resolving ──────►  Done
//! ```
//!
//! [`ConsensusProcess`] holds the candidates and ballots; the application
//! layer drives it by collecting ballots while it is in `Voting`. The final
//! tally is a pure function ([`tally`]) so it can be tested on its own.

use super::rule::{ConsensusRule, VotingMethod};
use super::vote::Vote;
use crate::agent::value_objects::AgentId;
use crate::round::AgentResponse;
use serde::{Deserialize, Serialize};

/// Content reported when no agent contributed a valid response.
pub const NO_VALID_CONTRIBUTIONS: &str = "no-valid-contributions";

/// Phase of a consensus round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusPhase {
    Collecting,
    Voting,
    Resolving,
    Done,
}

impl std::fmt::Display for ConsensusPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsensusPhase::Collecting => write!(f, "Collecting"),
            ConsensusPhase::Voting => write!(f, "Voting"),
            ConsensusPhase::Resolving => write!(f, "Resolving"),
            ConsensusPhase::Done => write!(f, "Done"),
        }
    }
}

/// A response that can be voted for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub index: usize,
    pub agent_id: AgentId,
    pub content: String,
}

/// Resolved outcome of a consensus round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// Author of the winning response (`None` when nothing was submitted)
    pub winner_agent_id: Option<AgentId>,
    pub winning_content: String,
    pub winning_index: Option<usize>,
    /// Winner's share of the total score (0.0 to 100.0)
    pub confidence_percent: f64,
    pub has_quorum: bool,
    /// Raw ballot count per candidate
    pub vote_counts: Vec<usize>,
    /// Weighted score per candidate (`weight × confidence / 10`)
    pub weighted_scores: Vec<f64>,
    pub strategy_used: VotingMethod,
    pub threshold: f64,
    /// Number of ballots tallied
    pub total_votes: usize,
}

impl ConsensusResult {
    /// Result for a round where every agent failed.
    pub fn no_valid_contributions(rule: &ConsensusRule) -> Self {
        Self {
            winner_agent_id: None,
            winning_content: NO_VALID_CONTRIBUTIONS.to_string(),
            winning_index: None,
            confidence_percent: 0.0,
            has_quorum: false,
            vote_counts: Vec::new(),
            weighted_scores: Vec::new(),
            strategy_used: rule.method,
            threshold: rule.threshold,
            total_votes: 0,
        }
    }

    /// Result for a round with a single candidate; no ballots are needed.
    pub fn unopposed(candidate: &Candidate, rule: &ConsensusRule) -> Self {
        Self {
            winner_agent_id: Some(candidate.agent_id.clone()),
            winning_content: candidate.content.clone(),
            winning_index: Some(candidate.index),
            confidence_percent: 100.0,
            has_quorum: rule.is_satisfied(100.0),
            vote_counts: vec![0],
            weighted_scores: vec![0.0],
            strategy_used: rule.method,
            threshold: rule.threshold,
            total_votes: 0,
        }
    }

    /// Confidence as a fraction (0.0 to 1.0)
    pub fn confidence(&self) -> f64 {
        self.confidence_percent / 100.0
    }

    /// Whether a real candidate won (false for the no-contribution result)
    pub fn has_winner(&self) -> bool {
        self.winner_agent_id.is_some()
    }

    /// Visual vote summary, e.g. `[3 2 0]`
    pub fn vote_summary(&self) -> String {
        let counts: Vec<String> = self.vote_counts.iter().map(|c| c.to_string()).collect();
        format!("[{}]", counts.join(" "))
    }
}

/// Tally ballots over `candidates` under `rule`.
///
/// - Simple majority: score = ballot count
/// - Weighted majority: score = Σ weight × confidence / 10
///
/// The winner is the first candidate reaching the maximum score (lowest
/// index wins ties). Ballots pointing outside the candidate list are
/// ignored. The percentage is clamped to 0-100; with no effective ballots
/// the first candidate wins at 0%.
pub fn tally(candidates: &[Candidate], votes: &[Vote], rule: &ConsensusRule) -> ConsensusResult {
    if candidates.is_empty() {
        return ConsensusResult::no_valid_contributions(rule);
    }

    let mut vote_counts = vec![0usize; candidates.len()];
    let mut weighted_scores = vec![0.0f64; candidates.len()];
    let mut total_votes = 0;

    for vote in votes {
        if vote.selected_index < candidates.len() {
            vote_counts[vote.selected_index] += 1;
            weighted_scores[vote.selected_index] += vote.weighted_contribution();
            total_votes += 1;
        }
    }

    let scores: Vec<f64> = match rule.method {
        VotingMethod::Simple => vote_counts.iter().map(|c| *c as f64).collect(),
        VotingMethod::Weighted => weighted_scores.clone(),
    };

    let mut winner = 0;
    for (i, score) in scores.iter().enumerate() {
        if *score > scores[winner] {
            winner = i;
        }
    }

    let total: f64 = scores.iter().sum();
    let confidence_percent = if total > 0.0 {
        (scores[winner] * 100.0 / total).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let candidate = &candidates[winner];
    ConsensusResult {
        winner_agent_id: Some(candidate.agent_id.clone()),
        winning_content: candidate.content.clone(),
        winning_index: Some(candidate.index),
        confidence_percent,
        has_quorum: total > 0.0 && rule.is_satisfied(confidence_percent),
        vote_counts,
        weighted_scores,
        strategy_used: rule.method,
        threshold: rule.threshold,
        total_votes,
    }
}

/// State of one consensus round.
#[derive(Debug, Clone)]
pub struct ConsensusProcess {
    phase: ConsensusPhase,
    rule: ConsensusRule,
    candidates: Vec<Candidate>,
    votes: Vec<Vote>,
}

impl ConsensusProcess {
    /// Collect the successful responses of a round as candidates.
    ///
    /// With zero candidates the process jumps straight to `Done`; with one
    /// it skips voting. Otherwise it waits in `Voting` for ballots.
    pub fn collect(responses: &[AgentResponse], rule: ConsensusRule) -> Self {
        let candidates: Vec<Candidate> = responses
            .iter()
            .filter(|r| r.succeeded)
            .enumerate()
            .map(|(index, r)| Candidate {
                index,
                agent_id: r.agent_id.clone(),
                content: r.content.clone(),
            })
            .collect();

        let phase = match candidates.len() {
            0 | 1 => ConsensusPhase::Done,
            _ => ConsensusPhase::Voting,
        };

        Self {
            phase,
            rule,
            candidates,
            votes: Vec::new(),
        }
    }

    pub fn phase(&self) -> ConsensusPhase {
        self.phase
    }

    pub fn rule(&self) -> &ConsensusRule {
        &self.rule
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    /// Whether ballots should be gathered before resolving.
    pub fn needs_ballots(&self) -> bool {
        self.phase == ConsensusPhase::Voting
    }

    /// Record a ballot. Ignored outside the voting phase.
    pub fn cast(&mut self, vote: Vote) -> bool {
        if self.phase != ConsensusPhase::Voting {
            return false;
        }
        self.votes.push(vote);
        true
    }

    /// Resolve the round and move to `Done`.
    pub fn resolve(&mut self) -> ConsensusResult {
        let result = match self.candidates.len() {
            0 => ConsensusResult::no_valid_contributions(&self.rule),
            1 => ConsensusResult::unopposed(&self.candidates[0], &self.rule),
            _ => {
                self.phase = ConsensusPhase::Resolving;
                tally(&self.candidates, &self.votes, &self.rule)
            }
        };
        self.phase = ConsensusPhase::Done;
        result
    }

    /// For each ballot, whether it picked the resolved winner.
    pub fn ballot_alignment(&self, result: &ConsensusResult) -> Vec<(AgentId, bool)> {
        self.votes
            .iter()
            .map(|v| (v.voter.clone(), Some(v.selected_index) == result.winning_index))
            .collect()
    }
}
