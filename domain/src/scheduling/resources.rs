//! Resource snapshots

use serde::{Deserialize, Serialize};

/// Point-in-time view of spare capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    /// Fraction of capacity free for new rounds (0.0 to 1.0)
    pub availability: f64,
}

impl Default for ResourceSnapshot {
    fn default() -> Self {
        Self { availability: 1.0 }
    }
}

impl ResourceSnapshot {
    pub fn new(availability: f64) -> Self {
        let availability = if availability.is_finite() {
            availability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { availability }
    }

    /// Availability as the free share of a pool.
    pub fn from_pool(free: usize, total: usize) -> Self {
        if total == 0 {
            Self::new(0.0)
        } else {
            Self::new(free as f64 / total as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped() {
        assert_eq!(ResourceSnapshot::new(1.7).availability, 1.0);
        assert_eq!(ResourceSnapshot::new(-1.0).availability, 0.0);
        assert_eq!(ResourceSnapshot::new(f64::NAN).availability, 0.0);
    }

    #[test]
    fn test_from_pool() {
        assert_eq!(ResourceSnapshot::from_pool(3, 4).availability, 0.75);
        assert_eq!(ResourceSnapshot::from_pool(0, 0).availability, 0.0);
    }
}
