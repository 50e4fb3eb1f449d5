//! Random jitter for variable round intervals

use council_application::JitterSource;
use council_domain::scheduling::JITTER_RANGE;
use rand::Rng;

/// Uniform jitter over the variable-interval range, drawn from the
/// thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn jitter(&self) -> f64 {
        let (low, high) = JITTER_RANGE;
        rand::rng().random_range(low..=high)
    }
}
