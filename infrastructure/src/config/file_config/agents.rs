//! Agent catalog from TOML (`[[agents]]` tables)
//!
//! Each entry describes one worker agent and the command that runs it. The
//! prompt is written to the command's stdin and the answer read from stdout.
//!
//! ```toml
//! [[agents]]
//! id = "analyst"
//! archetype = "analyst"
//! capabilities = ["rust", "design"]
//! cost_weight = 1.0
//! vote_weight = 1.5
//! tier = "standard"
//! command = "llm"
//! args = ["-m", "claude-sonnet"]
//! ```

use council_domain::{Agent, ConfigIssue, ConfigIssueCode, DeploymentTier};
use serde::{Deserialize, Serialize};

/// One `[[agents]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub id: String,
    pub archetype: String,
    pub capabilities: Vec<String>,
    pub cost_weight: f64,
    pub vote_weight: f64,
    /// Starting success rate, replaced by journal replay when available
    pub success_rate: Option<f64>,
    pub collaboration_score: Option<f64>,
    pub specialization: Option<String>,
    /// Minimum deployment tier needed to run this agent
    pub tier: Option<String>,
    pub command: String,
    pub args: Vec<String>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            archetype: "generalist".to_string(),
            capabilities: Vec::new(),
            cost_weight: 1.0,
            vote_weight: 1.0,
            success_rate: None,
            collaboration_score: None,
            specialization: None,
            tier: None,
            command: String::new(),
            args: Vec::new(),
        }
    }
}

impl FileAgentConfig {
    /// Build the domain agent, reporting values that had to be corrected.
    pub fn to_agent(&self) -> (Agent, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let label = format!("agents.{}", self.id);

        for (field, value) in [
            ("cost_weight", self.cost_weight),
            ("vote_weight", self.vote_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::WeightOutOfRange,
                    format!("{}.{}: {} is not a non-negative number; using 0", label, field, value),
                ));
            }
        }
        for (field, value) in [
            ("success_rate", self.success_rate),
            ("collaboration_score", self.collaboration_score),
        ] {
            if let Some(v) = value
                && !(0.0..=1.0).contains(&v)
            {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::WeightOutOfRange,
                    format!("{}.{}: {} clamped to 0.0..=1.0", label, field, v),
                ));
            }
        }

        let mut agent = Agent::new(self.id.trim(), self.archetype.as_str())
            .with_capabilities(&self.capabilities)
            .with_cost_weight(self.cost_weight)
            .with_vote_weight(self.vote_weight);
        if let Some(rate) = self.success_rate {
            agent = agent.with_success_rate(rate);
        }
        if let Some(score) = self.collaboration_score {
            agent = agent.with_collaboration_score(score);
        }
        if let Some(ref specialization) = self.specialization {
            agent = agent.with_specialization(specialization.as_str());
        }
        if let Some(ref tier) = self.tier {
            match tier.parse::<DeploymentTier>() {
                Ok(tier) => agent = agent.with_required_tier(tier),
                Err(e) => issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidTier,
                    format!("{}.tier: {}", label, e),
                )),
            }
        }

        (agent, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_agent() {
        let config = FileAgentConfig {
            id: "critic".to_string(),
            archetype: "critic".to_string(),
            capabilities: vec!["Review".to_string()],
            vote_weight: 2.0,
            success_rate: Some(0.9),
            tier: Some("premium".to_string()),
            command: "llm".to_string(),
            ..Default::default()
        };
        let (agent, issues) = config.to_agent();
        assert!(issues.is_empty());
        assert_eq!(agent.id.as_str(), "critic");
        assert_eq!(agent.capabilities, vec!["review"]);
        assert_eq!(agent.vote_weight, 2.0);
        assert_eq!(agent.success_rate, 0.9);
        assert_eq!(agent.required_tier, DeploymentTier::Premium);
    }

    #[test]
    fn test_out_of_range_values_are_reported() {
        let config = FileAgentConfig {
            id: "x".to_string(),
            vote_weight: -1.0,
            success_rate: Some(1.4),
            tier: Some("gold".to_string()),
            ..Default::default()
        };
        let (agent, issues) = config.to_agent();
        assert_eq!(agent.vote_weight, 0.0);
        assert_eq!(agent.success_rate, 1.0);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().any(|i| i.code == ConfigIssueCode::InvalidTier));
    }
}
