//! Vote types for consensus
//!
//! A [`Vote`] is one agent's ballot in the voting sub-round: which candidate
//! it picked, how confident it is (1-10) and how much its ballot weighs.

use crate::agent::entities::sanitize_weight;
use crate::agent::value_objects::AgentId;
use serde::{Deserialize, Serialize};

/// Lowest confidence a ballot can carry
pub const MIN_CONFIDENCE: f64 = 1.0;
/// Highest confidence a ballot can carry
pub const MAX_CONFIDENCE: f64 = 10.0;
/// Confidence assumed for ballots that could not be parsed
pub const NEUTRAL_CONFIDENCE: f64 = 5.0;

/// A single ballot from a voting agent
///
/// # Example
///
/// ```
/// use council_domain::quorum::Vote;
///
/// let vote = Vote::new("critic-1", 0, 8.0, 1.0);
/// assert_eq!(vote.normalized_confidence(), 0.8);
/// assert_eq!(vote.weighted_contribution(), 0.8);
///
/// // Out-of-range confidence is clamped
/// assert_eq!(Vote::new("critic-1", 0, 42.0, 1.0).confidence, 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: AgentId,
    /// Index into the candidate list of the round
    pub selected_index: usize,
    /// Confidence level (1.0 to 10.0)
    pub confidence: f64,
    /// Ballot weight (finite, non-negative)
    pub weight: f64,
}

impl Vote {
    pub fn new(
        voter: impl Into<AgentId>,
        selected_index: usize,
        confidence: f64,
        weight: f64,
    ) -> Self {
        Self {
            voter: voter.into(),
            selected_index,
            confidence: clamp_confidence(confidence),
            weight: sanitize_weight(weight),
        }
    }

    /// Confidence mapped onto 0.1-1.0
    pub fn normalized_confidence(&self) -> f64 {
        self.confidence / MAX_CONFIDENCE
    }

    /// Contribution of this ballot under weighted majority
    pub fn weighted_contribution(&self) -> f64 {
        self.weight * self.normalized_confidence()
    }
}

/// Clamp a raw confidence into 1-10; non-finite values become neutral.
pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
    } else {
        NEUTRAL_CONFIDENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_creation() {
        let vote = Vote::new("a", 2, 7.0, 1.5);
        assert_eq!(vote.voter.as_str(), "a");
        assert_eq!(vote.selected_index, 2);
        assert_eq!(vote.confidence, 7.0);
        assert!((vote.weighted_contribution() - 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_clamping() {
        assert_eq!(Vote::new("a", 0, 0.0, 1.0).confidence, 1.0);
        assert_eq!(Vote::new("a", 0, 11.0, 1.0).confidence, 10.0);
        assert_eq!(Vote::new("a", 0, f64::NAN, 1.0).confidence, 5.0);
    }

    #[test]
    fn test_negative_weight_is_zero() {
        let vote = Vote::new("a", 0, 10.0, -3.0);
        assert_eq!(vote.weight, 0.0);
        assert_eq!(vote.weighted_contribution(), 0.0);
    }
}
