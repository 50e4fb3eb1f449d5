//! Agent selection scoring.
//!
//! ```text
//! score = capability_overlap * 0.5 + success_rate * 0.3 + collaboration_score * 0.2
//! ```
//!
//! Agents failing a hard prerequisite (deployment tier) are filtered out
//! before scoring. Ranking is a stable sort, so equal scores keep
//! registration order.

use super::entities::Agent;
use super::value_objects::{DeploymentTier, normalize_capability};

const OVERLAP_WEIGHT: f64 = 0.5;
const SUCCESS_WEIGHT: f64 = 0.3;
const COLLABORATION_WEIGHT: f64 = 0.2;

/// Selection score of one agent against a requirement list.
pub fn selection_score(agent: &Agent, required: &[String]) -> f64 {
    agent.capability_overlap(required) * OVERLAP_WEIGHT
        + agent.success_rate * SUCCESS_WEIGHT
        + agent.collaboration_score * COLLABORATION_WEIGHT
}

/// Normalize and de-duplicate a requirement list, keeping first-seen order.
pub fn normalize_requirements<S: AsRef<str>>(required: &[S]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(required.len());
    for tag in required {
        let tag = normalize_capability(tag.as_ref());
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

/// Rank candidate agents and return the positions of the best `max_count`.
///
/// `candidates` yields `(position, agent)` pairs in registration order.
/// Agents the deployment tier does not permit are skipped.
pub fn rank_candidates<'a, I>(
    candidates: I,
    required: &[String],
    tier: DeploymentTier,
    max_count: usize,
) -> Vec<(usize, f64)>
where
    I: IntoIterator<Item = (usize, &'a Agent)>,
{
    let mut scored: Vec<(usize, f64)> = candidates
        .into_iter()
        .filter(|(_, agent)| tier.permits(agent.required_tier))
        .map(|(pos, agent)| (pos, selection_score(agent, required)))
        .collect();

    // sort_by is stable: ties keep insertion order
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(max_count);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agents() -> Vec<Agent> {
        vec![
            Agent::new("generalist", "general").with_capabilities(["writing"]),
            Agent::new("coder", "coder")
                .with_capabilities(["rust", "testing"])
                .with_success_rate(0.9),
            Agent::new("premium-coder", "coder")
                .with_capabilities(["rust", "testing"])
                .with_success_rate(1.0)
                .with_required_tier(DeploymentTier::Premium),
            Agent::new("tester", "qa").with_capabilities(["testing"]),
        ]
    }

    #[test]
    fn test_selection_score_formula() {
        let agent = Agent::new("a", "x")
            .with_capabilities(["rust"])
            .with_success_rate(0.5)
            .with_collaboration_score(1.0);
        let required = vec!["rust".to_string(), "go".to_string()];
        // 0.5*0.5 + 0.5*0.3 + 1.0*0.2
        assert!((selection_score(&agent, &required) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_rank_excludes_tier_restricted() {
        let agents = agents();
        let required = normalize_requirements(&["rust", "testing"]);
        let ranked = rank_candidates(
            agents.iter().enumerate(),
            &required,
            DeploymentTier::Free,
            10,
        );
        let ids: Vec<&str> = ranked.iter().map(|(i, _)| agents[*i].id.as_str()).collect();
        assert_eq!(ids, vec!["coder", "tester", "generalist"]);
    }

    #[test]
    fn test_rank_includes_premium_when_permitted() {
        let agents = agents();
        let required = normalize_requirements(&["rust"]);
        let ranked = rank_candidates(
            agents.iter().enumerate(),
            &required,
            DeploymentTier::Premium,
            1,
        );
        assert_eq!(agents[ranked[0].0].id.as_str(), "premium-coder");
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let agents = vec![
            Agent::new("first", "x"),
            Agent::new("second", "x"),
            Agent::new("third", "x"),
        ];
        let ranked = rank_candidates(agents.iter().enumerate(), &[], DeploymentTier::Free, 2);
        assert_eq!(ranked.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_normalize_requirements_dedupes() {
        let required = normalize_requirements(&["Rust", "rust ", "", "Go"]);
        assert_eq!(required, vec!["rust".to_string(), "go".to_string()]);
    }
}
