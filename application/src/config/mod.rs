//! Application-level configuration.
//!
//! - [`EngineConfig`]: settings shared by every task loop
//! - [`LoopOptions`]: per-task parameters given at submission

pub mod engine_config;
pub mod loop_options;

pub use engine_config::EngineConfig;
pub use loop_options::LoopOptions;
