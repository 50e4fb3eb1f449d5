//! Structured configuration issues.
//!
//! Configuration loaders report problems as [`ConfigIssue`]s instead of
//! failing outright, so callers can print warnings and refuse to start only
//! on errors.

use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// No agents are configured.
    NoAgents,
    /// Two agents share an id; the later one replaces the earlier.
    DuplicateAgentId,
    /// An agent has no command to run.
    MissingCommand,
    /// The consensus rule string cannot be parsed.
    InvalidConsensusRule,
    /// A tier name cannot be parsed.
    InvalidTier,
    /// A strategy name cannot be parsed.
    InvalidStrategy,
    /// A weight or score is negative or outside its range.
    WeightOutOfRange,
    /// An agent requires a higher tier than the deployment has.
    AgentTierUnreachable,
    /// `min_interval_ms` is larger than `max_interval_ms`.
    IntervalBoundsInverted,
    /// A timeout or capacity is zero.
    ZeroLimit,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", label, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let issue = ConfigIssue::error(ConfigIssueCode::NoAgents, "no agents");
        assert!(issue.is_error());
        assert_eq!(issue.to_string(), "error: no agents");

        let issue = ConfigIssue::warning(ConfigIssueCode::DuplicateAgentId, "dup");
        assert!(!issue.is_error());
        assert_eq!(issue.code, ConfigIssueCode::DuplicateAgentId);
    }
}
