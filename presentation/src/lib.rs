//! Presentation layer for agent-council
//!
//! This crate contains the CLI definition, output formatters and progress
//! reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::{ConsoleFormatter, LoopReport};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
