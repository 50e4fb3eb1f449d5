//! Next-round interval
//!
//! `interval = clamp(base × performance × resource × quality, min, max)`
//!
//! Each multiplier is a step function of its signal. Strong signals shorten
//! the wait; weak ones stretch it.

use super::strategy::{BaseInterval, TimingStrategy};
use serde::{Deserialize, Serialize};

pub const MIN_INTERVAL_MS: u64 = 1_000;
pub const MAX_INTERVAL_MS: u64 = 60_000;

/// Lowest and highest jitter factor for variable intervals
pub const JITTER_RANGE: (f64, f64) = (0.5, 1.5);

/// Signals observed after the last round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalSignals {
    /// Combined timeliness and quality (0.0 to 1.0)
    pub performance: f64,
    /// Quality of the last round (0.0 to 1.0)
    pub quality: f64,
    /// Spare capacity (0.0 to 1.0)
    pub resource_availability: f64,
}

impl Default for IntervalSignals {
    fn default() -> Self {
        Self {
            performance: 0.5,
            quality: 0.5,
            resource_availability: 1.0,
        }
    }
}

/// Inclusive clamp range for intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalBounds {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for IntervalBounds {
    fn default() -> Self {
        Self {
            min_ms: MIN_INTERVAL_MS,
            max_ms: MAX_INTERVAL_MS,
        }
    }
}

impl IntervalBounds {
    /// Bounds with `min <= max` enforced.
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: max_ms.max(min_ms),
        }
    }
}

pub fn quality_multiplier(quality: f64) -> f64 {
    if quality > 0.9 {
        0.75
    } else if quality > 0.7 {
        0.9
    } else if quality < 0.3 {
        1.4
    } else if quality < 0.5 {
        1.2
    } else {
        1.0
    }
}

pub fn performance_multiplier(performance: f64) -> f64 {
    if performance > 0.8 {
        0.8
    } else if performance < 0.4 {
        1.3
    } else {
        1.0
    }
}

pub fn resource_multiplier(availability: f64) -> f64 {
    if availability > 0.8 {
        0.85
    } else if availability < 0.3 {
        1.5
    } else if availability < 0.5 {
        1.2
    } else {
        1.0
    }
}

/// Base interval of a strategy before the signal multipliers.
///
/// `jitter` only affects `Variable` bases and is clamped to 0.5-1.5.
pub fn base_interval_ms(base: BaseInterval, performance: f64, jitter: f64) -> f64 {
    match base {
        BaseInterval::Fixed(ms) => ms as f64,
        BaseInterval::Dynamic => 3_000.0 + (1.0 - performance.clamp(0.0, 1.0)) * 7_000.0,
        BaseInterval::Variable(ms) => {
            let jitter = if jitter.is_finite() {
                jitter.clamp(JITTER_RANGE.0, JITTER_RANGE.1)
            } else {
                1.0
            };
            let performance_factor = if performance > 0.8 {
                0.8
            } else if performance < 0.4 {
                1.2
            } else {
                1.0
            };
            ms as f64 * jitter * performance_factor
        }
    }
}

/// Delay before the next round of a loop, in milliseconds.
///
/// ```
/// use council_domain::scheduling::{IntervalBounds, IntervalSignals, StrategyKind, compute_next_interval};
///
/// let signals = IntervalSignals { performance: 0.6, quality: 0.6, resource_availability: 0.6 };
/// let ms = compute_next_interval(&StrategyKind::Balanced.timing(), &signals, 1.0, IntervalBounds::default());
/// assert_eq!(ms, 5_000);
/// ```
pub fn compute_next_interval(
    strategy: &TimingStrategy,
    signals: &IntervalSignals,
    jitter: f64,
    bounds: IntervalBounds,
) -> u64 {
    let base = base_interval_ms(strategy.base, signals.performance, jitter);
    let interval = base
        * performance_multiplier(signals.performance)
        * resource_multiplier(signals.resource_availability)
        * quality_multiplier(signals.quality);
    let interval = if interval.is_finite() { interval } else { 0.0 };
    (interval.round() as u64).clamp(bounds.min_ms, bounds.max_ms)
}
