//! Resource and jitter ports
//!
//! Both are injected so tests can replace sampling and randomness with
//! fixed values.

use council_domain::ResourceSnapshot;

/// Source of resource-availability snapshots for strategy selection.
pub trait ResourceSnapshotProvider: Send + Sync {
    fn snapshot(&self) -> ResourceSnapshot;
}

/// Always reports the same snapshot.
pub struct StaticResources(pub ResourceSnapshot);

impl ResourceSnapshotProvider for StaticResources {
    fn snapshot(&self) -> ResourceSnapshot {
        self.0
    }
}

/// Source of jitter factors (0.5 to 1.5) for variable intervals.
pub trait JitterSource: Send + Sync {
    fn jitter(&self) -> f64;
}

/// Always returns the same factor.
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn jitter(&self) -> f64 {
        self.0
    }
}
