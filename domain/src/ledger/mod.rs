//! Performance ledger domain
//!
//! Per-loop round outcomes and the window statistics derived from them.

pub mod entities;
pub mod history;

pub use entities::{RoundOutcome, performance_score, round_quality};
pub use history::{DEFAULT_LEDGER_CAPACITY, PerformanceLedger, Trend, WindowStats};
