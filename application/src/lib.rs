//! Application layer for agent-council
//!
//! This crate contains the engine, its use cases, port definitions, and
//! engine configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EngineConfig, LoopOptions};
pub use ports::{
    agent_gateway::{AgentGateway, AgentReply, GatewayError},
    progress::{NoProgress, ProgressNotifier, RoundPhase},
    resources::{FixedJitter, JitterSource, ResourceSnapshotProvider, StaticResources},
    state_journal::{JournalEntry, NoJournal, StateJournal},
};
pub use use_cases::build_consensus::{BuildConsensusUseCase, ConsensusOutput};
pub use use_cases::engine::{Engine, EngineBuilder, PoolResources, RestoreSummary};
pub use use_cases::run_round::{RunRoundError, RunRoundUseCase};
pub use use_cases::task_loop::{LoopState, LoopStatus};
