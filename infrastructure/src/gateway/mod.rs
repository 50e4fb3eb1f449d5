//! Agent gateway adapters

mod process;

pub use process::{AgentCommand, ProcessAgentGateway};
