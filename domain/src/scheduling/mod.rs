//! Adaptive scheduling domain
//!
//! Pure functions the task loop uses between rounds:
//!
//! - [`select_strategy`] picks a [`StrategyKind`] from context, history and
//!   resources
//! - [`compute_next_interval`] paces the next round
//! - [`ErrorKind::classify`] and [`compute_retry_interval`] drive backoff
//!   after a failed round

pub mod interval;
pub mod resources;
pub mod retry;
pub mod selection;
pub mod strategy;

pub use interval::{
    IntervalBounds, IntervalSignals, JITTER_RANGE, MAX_INTERVAL_MS, MIN_INTERVAL_MS,
    compute_next_interval,
};
pub use resources::ResourceSnapshot;
pub use retry::{
    DEFAULT_RETRY_BASE_MS, ErrorKind, MAX_RETRY_INTERVAL_MS, RecoveryAction,
    compute_retry_interval,
};
pub use selection::{LoopContext, RECENT_WINDOW, select_strategy};
pub use strategy::{BaseInterval, PhaseWeights, StrategyKind, TimingStrategy};
