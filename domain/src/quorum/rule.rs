//! Consensus rules
//!
//! A [`ConsensusRule`] pairs a [`VotingMethod`] with the quorum threshold
//! (fraction of the total score the winner needs).

use serde::{Deserialize, Serialize};

/// Default quorum threshold (60% of the total score)
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// How ballots are tallied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingMethod {
    /// One ballot, one vote
    Simple,
    /// Each ballot counts `weight × confidence / 10`
    #[default]
    Weighted,
}

impl VotingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            VotingMethod::Simple => "simple",
            VotingMethod::Weighted => "weighted",
        }
    }
}

impl std::fmt::Display for VotingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rule for resolving a consensus round
///
/// # Example
///
/// ```
/// use council_domain::quorum::{ConsensusRule, VotingMethod};
///
/// let rule: ConsensusRule = "weighted:0.75".parse().unwrap();
/// assert_eq!(rule.method, VotingMethod::Weighted);
/// assert!(rule.is_satisfied(75.0));
/// assert!(!rule.is_satisfied(74.9));
///
/// let simple: ConsensusRule = "majority:50%".parse().unwrap();
/// assert_eq!(simple.method, VotingMethod::Simple);
/// assert_eq!(simple.threshold, 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsensusRule {
    pub method: VotingMethod,
    /// Fraction (0.0 to 1.0) of the total score the winner needs
    pub threshold: f64,
}

impl Default for ConsensusRule {
    fn default() -> Self {
        Self {
            method: VotingMethod::Weighted,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ConsensusRule {
    pub fn new(method: VotingMethod, threshold: f64) -> Self {
        let threshold = if threshold.is_finite() {
            threshold.clamp(0.0, 1.0)
        } else {
            DEFAULT_THRESHOLD
        };
        Self { method, threshold }
    }

    pub fn simple(threshold: f64) -> Self {
        Self::new(VotingMethod::Simple, threshold)
    }

    pub fn weighted(threshold: f64) -> Self {
        Self::new(VotingMethod::Weighted, threshold)
    }

    /// Threshold expressed as a percentage
    pub fn threshold_percent(&self) -> f64 {
        self.threshold * 100.0
    }

    /// Whether a confidence percentage reaches quorum.
    pub fn is_satisfied(&self, confidence_percent: f64) -> bool {
        // tolerance for binary fractions like 0.6 * 100
        confidence_percent + 1e-9 >= self.threshold_percent()
    }

    /// Get a human-readable description of this rule
    pub fn description(&self) -> String {
        format!(
            "{} majority (quorum at {:.0}%)",
            self.method,
            self.threshold_percent()
        )
    }
}

impl std::fmt::Display for ConsensusRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for ConsensusRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let (method_str, threshold_str) = match s.split_once(':') {
            Some((m, t)) => (m, Some(t)),
            None => (s.as_str(), None),
        };

        let method = match method_str {
            "simple" | "majority" => VotingMethod::Simple,
            "weighted" => VotingMethod::Weighted,
            other => {
                return Err(format!(
                    "Unknown consensus rule: {}. Valid: simple, weighted, simple:0.6, weighted:75%",
                    other
                ));
            }
        };

        let threshold = match threshold_str {
            None => DEFAULT_THRESHOLD,
            Some(t) => parse_threshold(t)?,
        };

        Ok(Self::new(method, threshold))
    }
}

/// Parse "0.6", "60%" or "60" into a fraction.
fn parse_threshold(s: &str) -> Result<f64, String> {
    let s = s.trim();
    let (num_str, is_percent) = match s.strip_suffix('%') {
        Some(n) => (n, true),
        None => (s, false),
    };
    let value: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid threshold: {}", s))?;
    let fraction = if is_percent || value > 1.0 {
        value / 100.0
    } else {
        value
    };
    if !(0.0..=1.0).contains(&fraction) {
        return Err(format!("Threshold out of range: {}", s));
    }
    Ok(fraction)
}
