//! Infrastructure layer for agent-council
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod gateway;
pub mod jitter;
pub mod journal;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigLoader, FileAgentConfig, FileConfig, FileConsensusConfig,
    FileEngineConfig, FileOutputConfig, FileSchedulerConfig,
};
pub use gateway::{AgentCommand, ProcessAgentGateway};
pub use jitter::RandomJitter;
pub use journal::{JournalError, JsonlStateJournal, Replay, replay};
