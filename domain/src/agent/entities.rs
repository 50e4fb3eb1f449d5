//! Agent entities.
//!
//! An [`Agent`] is one worker in the council: an archetype with capability
//! tags, a cost weight, a vote weight and a running success rate that the
//! consensus step updates after every ballot.

use super::value_objects::{AgentId, DeploymentTier, normalize_capability};
use serde::{Deserialize, Serialize};

/// Default success rate for an agent with no voting history.
pub const DEFAULT_SUCCESS_RATE: f64 = 0.5;

/// Ballot history of an agent across all rounds.
///
/// `correct` counts ballots that picked the eventual winner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub correct: u64,
    pub total: u64,
}

impl VoteRecord {
    /// Ratio of correct ballots, or `None` before the first ballot.
    pub fn accuracy(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.correct as f64 / self.total as f64)
        }
    }
}

/// A worker agent in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// Archetype name (e.g. "analyst", "critic")
    pub archetype: String,
    /// Normalized capability tags
    pub capabilities: Vec<String>,
    /// Relative cost of invoking this agent once
    pub cost_weight: f64,
    /// Weight of this agent's ballots in weighted consensus
    pub vote_weight: f64,
    /// Historical success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// How well this agent works alongside others (0.0 to 1.0)
    pub collaboration_score: f64,
    /// Optional free-form specialization label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    /// Minimum deployment tier needed to run this agent
    #[serde(default)]
    pub required_tier: DeploymentTier,
    #[serde(default)]
    pub vote_record: VoteRecord,
}

impl Agent {
    pub fn new(id: impl Into<AgentId>, archetype: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            archetype: archetype.into(),
            capabilities: Vec::new(),
            cost_weight: 1.0,
            vote_weight: 1.0,
            success_rate: DEFAULT_SUCCESS_RATE,
            collaboration_score: 0.5,
            specialization: None,
            required_tier: DeploymentTier::Free,
            vote_record: VoteRecord::default(),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.capabilities = capabilities
            .into_iter()
            .map(|c| normalize_capability(c.as_ref()))
            .filter(|c| !c.is_empty())
            .collect();
        self
    }

    pub fn with_cost_weight(mut self, cost_weight: f64) -> Self {
        self.cost_weight = sanitize_weight(cost_weight);
        self
    }

    pub fn with_vote_weight(mut self, vote_weight: f64) -> Self {
        self.vote_weight = sanitize_weight(vote_weight);
        self
    }

    pub fn with_success_rate(mut self, rate: f64) -> Self {
        self.success_rate = clamp_unit(rate);
        self
    }

    pub fn with_collaboration_score(mut self, score: f64) -> Self {
        self.collaboration_score = clamp_unit(score);
        self
    }

    pub fn with_specialization(mut self, specialization: impl Into<String>) -> Self {
        self.specialization = Some(specialization.into());
        self
    }

    pub fn with_required_tier(mut self, tier: DeploymentTier) -> Self {
        self.required_tier = tier;
        self
    }

    // ==================== Queries ====================

    /// Whether the agent carries the given capability tag.
    pub fn has_capability(&self, tag: &str) -> bool {
        let tag = normalize_capability(tag);
        self.capabilities.iter().any(|c| *c == tag)
    }

    /// Fraction of `required` capabilities this agent covers.
    ///
    /// An empty requirement list counts as full coverage.
    pub fn capability_overlap(&self, required: &[String]) -> f64 {
        if required.is_empty() {
            return 1.0;
        }
        let matched = required.iter().filter(|r| self.has_capability(r)).count();
        matched as f64 / required.len() as f64
    }

    /// Record one ballot and recompute the success rate as correct / total.
    pub fn record_ballot(&mut self, voted_for_winner: bool) {
        self.vote_record.total += 1;
        if voted_for_winner {
            self.vote_record.correct += 1;
        }
        if let Some(accuracy) = self.vote_record.accuracy() {
            self.success_rate = accuracy;
        }
    }

    /// Replace the ballot history (journal replay).
    pub fn restore_vote_record(&mut self, record: VoteRecord) {
        self.vote_record = record;
        if let Some(accuracy) = record.accuracy() {
            self.success_rate = accuracy;
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Weights must be finite and non-negative.
pub fn sanitize_weight(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_defaults() {
        let agent = Agent::new("a1", "analyst");
        assert_eq!(agent.id.as_str(), "a1");
        assert_eq!(agent.success_rate, DEFAULT_SUCCESS_RATE);
        assert_eq!(agent.vote_weight, 1.0);
        assert_eq!(agent.required_tier, DeploymentTier::Free);
    }

    #[test]
    fn test_capability_overlap() {
        let agent = Agent::new("a1", "coder").with_capabilities(["Rust", "testing"]);
        let required = vec!["rust".to_string(), "security".to_string()];
        assert_eq!(agent.capability_overlap(&required), 0.5);
        assert_eq!(agent.capability_overlap(&[]), 1.0);
        assert!(agent.has_capability(" RUST "));
    }

    #[test]
    fn test_record_ballot_updates_rate() {
        let mut agent = Agent::new("a1", "critic");
        agent.record_ballot(true);
        assert_eq!(agent.success_rate, 1.0);
        agent.record_ballot(false);
        assert_eq!(agent.success_rate, 0.5);
        agent.record_ballot(false);
        assert!((agent.success_rate - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(agent.vote_record, VoteRecord { correct: 1, total: 3 });
    }

    #[test]
    fn test_weights_are_sanitized() {
        let agent = Agent::new("a", "x")
            .with_vote_weight(-2.0)
            .with_cost_weight(f64::NAN)
            .with_success_rate(4.0);
        assert_eq!(agent.vote_weight, 0.0);
        assert_eq!(agent.cost_weight, 0.0);
        assert_eq!(agent.success_rate, 1.0);
    }

    #[test]
    fn test_restore_vote_record() {
        let mut agent = Agent::new("a", "x");
        agent.restore_vote_record(VoteRecord {
            correct: 3,
            total: 4,
        });
        assert_eq!(agent.success_rate, 0.75);

        let mut fresh = Agent::new("b", "x").with_success_rate(0.9);
        fresh.restore_vote_record(VoteRecord::default());
        assert_eq!(fresh.success_rate, 0.9);
    }
}
