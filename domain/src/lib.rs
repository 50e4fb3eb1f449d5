//! Domain layer for agent-council
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Council
//!
//! A council is a pool of independent worker agents. For each round of a
//! task loop a subset is selected, asked the task in parallel, and then
//! asked to vote on each other's answers.
//!
//! ## Consensus
//!
//! - **Simple majority**: one ballot, one vote
//! - **Weighted majority**: ballots count `weight × confidence / 10`
//!
//! A result has quorum when the winner's share reaches the rule threshold.
//!
//! ## Adaptive scheduling
//!
//! Between rounds a timing strategy is chosen from the loop context and the
//! performance ledger; failed rounds are classified and backed off.

pub mod agent;
pub mod config;
pub mod core;
pub mod ledger;
pub mod prompt;
pub mod quorum;
pub mod round;
pub mod scheduling;
pub mod task;
pub mod util;

// Re-export commonly used types
pub use agent::{
    entities::{Agent, VoteRecord},
    registry::AgentRegistry,
    value_objects::{AgentId, DeploymentTier},
};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::error::CouncilError;
pub use ledger::{PerformanceLedger, RoundOutcome, Trend, WindowStats};
pub use prompt::PromptTemplate;
pub use quorum::{
    Ballot, Candidate, ConsensusPhase, ConsensusProcess, ConsensusResult, ConsensusRule, Vote,
    VotingMethod, parse_ballot,
};
pub use round::{AgentResponse, RoundReport};
pub use scheduling::{
    ErrorKind, IntervalBounds, IntervalSignals, LoopContext, RecoveryAction, ResourceSnapshot,
    StrategyKind, TimingStrategy, compute_next_interval, compute_retry_interval, select_strategy,
};
pub use task::{Task, TaskId, TaskLoopId};
