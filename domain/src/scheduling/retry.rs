//! Error classification and retry backoff
//!
//! Failures are sorted into a closed set of [`ErrorKind`]s by a pure function
//! of the message. Each kind carries a fixed backoff multiplier and a list of
//! [`RecoveryAction`]s for the caller to apply.

use crate::core::error::CouncilError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default base retry interval
pub const DEFAULT_RETRY_BASE_MS: u64 = 5_000;
/// Upper bound on any retry interval (5 minutes)
pub const MAX_RETRY_INTERVAL_MS: u64 = 300_000;

/// Classified kind of a round failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RateLimit,
    NetworkError,
    ResourceExhaustion,
    TemporaryFailure,
    Unknown,
}

/// What the caller should do about a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    IncreaseInterval,
    ReduceConcurrency,
    SwitchProvider,
    RetryWithBackoff,
    CheckConnectivity,
    FreeResources,
    RetryLater,
}

impl ErrorKind {
    /// Classify a failure message.
    ///
    /// HTTP status codes are checked first since they are unambiguous.
    ///
    /// # Examples
    ///
    /// ```
    /// use council_domain::scheduling::ErrorKind;
    ///
    /// assert_eq!(ErrorKind::classify("HTTP 429 Too Many Requests"), ErrorKind::RateLimit);
    /// assert_eq!(ErrorKind::classify("connection reset by peer"), ErrorKind::NetworkError);
    /// assert_eq!(ErrorKind::classify("segfault"), ErrorKind::Unknown);
    /// ```
    pub fn classify(message: &str) -> Self {
        let msg = message.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| msg.contains(n));

        if has(&["429", "rate limit", "rate-limit", "too many requests", "quota"]) {
            return ErrorKind::RateLimit;
        }
        if has(&["502", "503", "504"]) {
            return ErrorKind::NetworkError;
        }
        if has(&[
            "out of memory",
            "memory",
            "resource",
            "exhausted",
            "capacity",
            "no eligible",
        ]) {
            return ErrorKind::ResourceExhaustion;
        }
        if has(&[
            "timeout",
            "timed out",
            "connection",
            "network",
            "dns",
            "unreachable",
        ]) {
            return ErrorKind::NetworkError;
        }
        if has(&["temporary", "temporarily", "unavailable", "try again", "busy"]) {
            return ErrorKind::TemporaryFailure;
        }
        ErrorKind::Unknown
    }

    /// Classify a domain error, looking at the variant before the message.
    pub fn of(error: &CouncilError) -> Self {
        match error {
            CouncilError::AgentTimeout { .. } => ErrorKind::NetworkError,
            CouncilError::NoEligibleAgents => ErrorKind::ResourceExhaustion,
            CouncilError::AgentInvocation { message, .. } => Self::classify(message),
            other => Self::classify(&other.to_string()),
        }
    }

    /// Backoff multiplier for this kind.
    pub fn multiplier(&self) -> f64 {
        match self {
            ErrorKind::RateLimit => 3.0,
            ErrorKind::ResourceExhaustion => 4.0,
            ErrorKind::NetworkError => 2.5,
            ErrorKind::TemporaryFailure => 2.0,
            ErrorKind::Unknown => 1.5,
        }
    }

    pub fn recovery_actions(&self) -> &'static [RecoveryAction] {
        use RecoveryAction::*;
        match self {
            ErrorKind::RateLimit => &[IncreaseInterval, ReduceConcurrency, SwitchProvider],
            ErrorKind::NetworkError => &[RetryWithBackoff, CheckConnectivity],
            ErrorKind::ResourceExhaustion => &[ReduceConcurrency, FreeResources, IncreaseInterval],
            ErrorKind::TemporaryFailure => &[RetryWithBackoff],
            ErrorKind::Unknown => &[RetryLater],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::ResourceExhaustion => "resource_exhaustion",
            ErrorKind::TemporaryFailure => "temporary_failure",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecoveryAction::IncreaseInterval => "increase interval",
            RecoveryAction::ReduceConcurrency => "reduce concurrency",
            RecoveryAction::SwitchProvider => "switch provider",
            RecoveryAction::RetryWithBackoff => "retry with backoff",
            RecoveryAction::CheckConnectivity => "check connectivity",
            RecoveryAction::FreeResources => "free resources",
            RecoveryAction::RetryLater => "retry later",
        };
        write!(f, "{}", s)
    }
}

/// Delay before retrying after `consecutive_errors` failures in a row.
///
/// `min(base × multiplier × max(consecutive_errors, 1), 300000)`
///
/// ```
/// use council_domain::scheduling::{ErrorKind, compute_retry_interval};
///
/// assert_eq!(compute_retry_interval(ErrorKind::RateLimit, 2, 5_000), 30_000);
/// ```
pub fn compute_retry_interval(kind: ErrorKind, consecutive_errors: u32, base_ms: u64) -> u64 {
    let factor = consecutive_errors.max(1) as f64;
    let interval = base_ms as f64 * kind.multiplier() * factor;
    if interval >= MAX_RETRY_INTERVAL_MS as f64 {
        MAX_RETRY_INTERVAL_MS
    } else {
        interval.round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KINDS: [ErrorKind; 5] = [
        ErrorKind::RateLimit,
        ErrorKind::NetworkError,
        ErrorKind::ResourceExhaustion,
        ErrorKind::TemporaryFailure,
        ErrorKind::Unknown,
    ];

    #[test]
    fn test_classify() {
        assert_eq!(ErrorKind::classify("Rate limit exceeded"), ErrorKind::RateLimit);
        assert_eq!(ErrorKind::classify("monthly quota reached"), ErrorKind::RateLimit);
        assert_eq!(ErrorKind::classify("503 Service Unavailable"), ErrorKind::NetworkError);
        assert_eq!(ErrorKind::classify("request timed out"), ErrorKind::NetworkError);
        assert_eq!(ErrorKind::classify("DNS lookup failed"), ErrorKind::NetworkError);
        assert_eq!(ErrorKind::classify("out of memory"), ErrorKind::ResourceExhaustion);
        assert_eq!(ErrorKind::classify("server busy, try again"), ErrorKind::TemporaryFailure);
        assert_eq!(ErrorKind::classify("bad input"), ErrorKind::Unknown);
    }

    #[test]
    fn test_classify_domain_errors() {
        assert_eq!(ErrorKind::of(&CouncilError::NoEligibleAgents), ErrorKind::ResourceExhaustion);
        assert_eq!(
            ErrorKind::of(&CouncilError::AgentTimeout {
                agent: "a".into(),
                timeout_ms: 10
            }),
            ErrorKind::NetworkError
        );
        assert_eq!(
            ErrorKind::of(&CouncilError::AgentInvocation {
                agent: "a".into(),
                message: "429".into()
            }),
            ErrorKind::RateLimit
        );
    }

    #[test]
    fn test_rate_limit_scenario() {
        assert_eq!(compute_retry_interval(ErrorKind::RateLimit, 2, 5_000), 30_000);
    }

    #[test]
    fn test_zero_consecutive_counts_as_one() {
        assert_eq!(compute_retry_interval(ErrorKind::Unknown, 0, 1_000), 1_500);
    }

    #[test]
    fn test_backoff_non_decreasing_and_capped() {
        for kind in KINDS {
            let mut previous = 0;
            for n in 0..200 {
                let interval = compute_retry_interval(kind, n, DEFAULT_RETRY_BASE_MS);
                assert!(interval >= previous);
                assert!(interval <= MAX_RETRY_INTERVAL_MS);
                previous = interval;
            }
            assert_eq!(previous, MAX_RETRY_INTERVAL_MS);
        }
    }

    #[test]
    fn test_recovery_actions() {
        assert!(ErrorKind::RateLimit.recovery_actions().contains(&RecoveryAction::ReduceConcurrency));
        assert!(!ErrorKind::Unknown.recovery_actions().is_empty());
    }
}
