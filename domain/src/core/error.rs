//! Domain error types

use thiserror::Error;

/// Errors raised by the consensus and scheduling core.
///
/// Per-agent failures ([`CouncilError::AgentTimeout`],
/// [`CouncilError::AgentInvocation`]) are normally absorbed by the round
/// executor and only surface as aggregate counts. Round-level failures
/// ([`CouncilError::AllAgentsFailed`], [`CouncilError::NoEligibleAgents`])
/// reach the scheduler, which classifies them for retry backoff.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CouncilError {
    #[error("Agent {agent} timed out after {timeout_ms}ms")]
    AgentTimeout { agent: String, timeout_ms: u64 },

    #[error("Agent {agent} invocation failed: {message}")]
    AgentInvocation { agent: String, message: String },

    #[error("No eligible agents available (resource exhausted)")]
    NoEligibleAgents,

    #[error("No quorum: confidence {confidence_percent:.1}% below threshold {threshold_percent:.1}%")]
    NoQuorum {
        confidence_percent: f64,
        threshold_percent: f64,
    },

    #[error("All {attempted} agents failed to respond")]
    AllAgentsFailed { attempted: usize },

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl CouncilError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CouncilError::Cancelled)
    }

    /// Whether this error aborts a round as a whole.
    ///
    /// Per-agent errors never do; they are folded into the round report.
    pub fn is_round_failure(&self) -> bool {
        matches!(
            self,
            CouncilError::AllAgentsFailed { .. } | CouncilError::NoEligibleAgents
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_error_display() {
        let error = CouncilError::Cancelled;
        assert_eq!(error.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_is_cancelled_check() {
        assert!(CouncilError::Cancelled.is_cancelled());
        assert!(!CouncilError::NoEligibleAgents.is_cancelled());
        assert!(!CouncilError::AllAgentsFailed { attempted: 3 }.is_cancelled());
    }

    #[test]
    fn test_round_failures() {
        assert!(CouncilError::AllAgentsFailed { attempted: 2 }.is_round_failure());
        assert!(CouncilError::NoEligibleAgents.is_round_failure());
        assert!(
            !CouncilError::AgentTimeout {
                agent: "a".into(),
                timeout_ms: 10
            }
            .is_round_failure()
        );
    }

    #[test]
    fn test_no_quorum_display() {
        let error = CouncilError::NoQuorum {
            confidence_percent: 54.5,
            threshold_percent: 60.0,
        };
        assert_eq!(
            error.to_string(),
            "No quorum: confidence 54.5% below threshold 60.0%"
        );
    }
}
