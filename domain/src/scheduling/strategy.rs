//! Timing strategies
//!
//! A [`StrategyKind`] names a pacing profile; [`StrategyKind::timing`] looks up
//! its immutable [`TimingStrategy`] catalog entry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Named pacing profile for a task loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Short intervals, tight voting window
    Aggressive,
    #[default]
    Balanced,
    /// Long intervals, generous voting window
    Conservative,
    /// Interval recomputed from the live performance score
    Adaptive,
    /// Randomized interval for exploring pacing
    Experimental,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Aggressive,
        StrategyKind::Balanced,
        StrategyKind::Conservative,
        StrategyKind::Adaptive,
        StrategyKind::Experimental,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Aggressive => "aggressive",
            StrategyKind::Balanced => "balanced",
            StrategyKind::Conservative => "conservative",
            StrategyKind::Adaptive => "adaptive",
            StrategyKind::Experimental => "experimental",
        }
    }

    /// Catalog entry for this strategy.
    pub fn timing(&self) -> TimingStrategy {
        let (base, voting) = match self {
            StrategyKind::Aggressive => (BaseInterval::Fixed(2_000), 0.4),
            StrategyKind::Balanced => (BaseInterval::Fixed(5_000), 0.5),
            StrategyKind::Conservative => (BaseInterval::Fixed(10_000), 0.75),
            StrategyKind::Adaptive => (BaseInterval::Dynamic, 0.5),
            StrategyKind::Experimental => (BaseInterval::Variable(5_000), 0.6),
        };
        TimingStrategy {
            kind: *self,
            base,
            phase_weights: PhaseWeights {
                response: 1.0,
                voting,
            },
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aggressive" | "fast" => Ok(StrategyKind::Aggressive),
            "balanced" | "default" => Ok(StrategyKind::Balanced),
            "conservative" | "slow" => Ok(StrategyKind::Conservative),
            "adaptive" | "dynamic" => Ok(StrategyKind::Adaptive),
            "experimental" => Ok(StrategyKind::Experimental),
            _ => Err(format!(
                "Invalid strategy: {}. Valid: aggressive, balanced, conservative, adaptive, experimental",
                s
            )),
        }
    }
}

/// Base of the inter-round interval before multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "ms", rename_all = "lowercase")]
pub enum BaseInterval {
    Fixed(u64),
    /// Recomputed each round from the performance score
    Dynamic,
    /// Randomized 0.5x to 1.5x around the given value
    Variable(u64),
}

/// Relative length of the response and voting phases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseWeights {
    pub response: f64,
    pub voting: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingStrategy {
    pub kind: StrategyKind,
    pub base: BaseInterval,
    pub phase_weights: PhaseWeights,
}

impl TimingStrategy {
    /// Deadline for the voting sub-round, scaled from the response deadline.
    ///
    /// Never shorter than 1ms so a ballot request always gets a chance.
    pub fn voting_timeout(&self, response_timeout: Duration) -> Duration {
        let ratio = if self.phase_weights.response > 0.0 {
            self.phase_weights.voting / self.phase_weights.response
        } else {
            1.0
        };
        let ms = (response_timeout.as_millis() as f64 * ratio).round().max(1.0);
        Duration::from_millis(ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy() {
        assert_eq!("aggressive".parse(), Ok(StrategyKind::Aggressive));
        assert_eq!("Conservative".parse(), Ok(StrategyKind::Conservative));
        assert_eq!("dynamic".parse(), Ok(StrategyKind::Adaptive));
        assert!("turbo".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.to_string().parse::<StrategyKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_catalog() {
        assert_eq!(
            StrategyKind::Aggressive.timing().base,
            BaseInterval::Fixed(2_000)
        );
        assert_eq!(StrategyKind::Adaptive.timing().base, BaseInterval::Dynamic);
        assert_eq!(
            StrategyKind::Experimental.timing().base,
            BaseInterval::Variable(5_000)
        );
    }

    #[test]
    fn test_voting_timeout_balanced_is_half() {
        let timing = StrategyKind::Balanced.timing();
        assert_eq!(
            timing.voting_timeout(Duration::from_secs(10)),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_voting_timeout_never_zero() {
        let timing = StrategyKind::Aggressive.timing();
        assert_eq!(
            timing.voting_timeout(Duration::from_millis(1)),
            Duration::from_millis(1)
        );
    }
}
