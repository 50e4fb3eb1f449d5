//! Round value objects - per-agent responses and the aggregate round report.
//!
//! - [`AgentResponse`] - one agent's answer (or failure) in a round
//! - [`RoundReport`] - everything the round executor gathered before the
//!   deadline, plus failure counts for the performance ledger

use crate::agent::value_objects::AgentId;
use serde::{Deserialize, Serialize};

/// Response from a single agent in the response phase of a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_id: AgentId,
    pub content: String,
    pub latency_ms: u64,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the failure was a deadline expiry
    #[serde(default)]
    pub timed_out: bool,
}

impl AgentResponse {
    pub fn success(agent_id: AgentId, content: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            agent_id,
            content: content.into(),
            latency_ms,
            succeeded: true,
            error: None,
            timed_out: false,
        }
    }

    pub fn failure(agent_id: AgentId, error: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            agent_id,
            content: String::new(),
            latency_ms,
            succeeded: false,
            error: Some(error.into()),
            timed_out: false,
        }
    }

    pub fn timeout(agent_id: AgentId, timeout_ms: u64) -> Self {
        Self {
            timed_out: true,
            ..Self::failure(agent_id, format!("timed out after {}ms", timeout_ms), timeout_ms)
        }
    }
}

/// Outcome of the response phase of one round.
///
/// `responses` follows the order agents were selected in, not arrival
/// order; successful entries become the candidate list of the consensus
/// step in that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub responses: Vec<AgentResponse>,
    pub attempted: usize,
    pub duration_ms: u64,
}

impl RoundReport {
    pub fn new(responses: Vec<AgentResponse>, attempted: usize, duration_ms: u64) -> Self {
        Self {
            responses,
            attempted,
            duration_ms,
        }
    }

    pub fn successful(&self) -> impl Iterator<Item = &AgentResponse> {
        self.responses.iter().filter(|r| r.succeeded)
    }

    pub fn success_count(&self) -> usize {
        self.successful().count()
    }

    /// Agents that errored or timed out (includes agents that never reported).
    pub fn failure_count(&self) -> usize {
        self.attempted.saturating_sub(self.success_count())
    }

    pub fn timeout_count(&self) -> usize {
        self.responses.iter().filter(|r| r.timed_out).count()
    }

    pub fn all_failed(&self) -> bool {
        self.success_count() == 0
    }

    /// Fraction of attempted agents that answered.
    pub fn participation(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.success_count() as f64 / self.attempted as f64
        }
    }

    /// First error message in the round, used to classify an all-fail round.
    pub fn first_error(&self) -> Option<&str> {
        self.responses.iter().find_map(|r| r.error.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RoundReport {
        RoundReport::new(
            vec![
                AgentResponse::success(AgentId::new("a"), "answer a", 120),
                AgentResponse::timeout(AgentId::new("b"), 500),
                AgentResponse::failure(AgentId::new("c"), "429 Too Many Requests", 30),
                AgentResponse::success(AgentId::new("d"), "answer d", 200),
            ],
            4,
            500,
        )
    }

    #[test]
    fn test_counts() {
        let report = report();
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 2);
        assert_eq!(report.timeout_count(), 1);
        assert_eq!(report.participation(), 0.5);
        assert!(!report.all_failed());
    }

    #[test]
    fn test_successful_keeps_order() {
        let report = report();
        let ids: Vec<&str> = report.successful().map(|r| r.agent_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
    }

    #[test]
    fn test_timeout_response() {
        let response = AgentResponse::timeout(AgentId::new("x"), 250);
        assert!(!response.succeeded);
        assert!(response.timed_out);
        assert_eq!(response.error.as_deref(), Some("timed out after 250ms"));
    }

    #[test]
    fn test_empty_report() {
        let report = RoundReport::default();
        assert!(report.all_failed());
        assert_eq!(report.participation(), 0.0);
        assert!(report.first_error().is_none());
    }

    #[test]
    fn test_first_error() {
        assert_eq!(report().first_error(), Some("timed out after 500ms"));
    }
}
