//! Port definitions (interfaces for external adapters)

pub mod agent_gateway;
pub mod progress;
pub mod resources;
pub mod state_journal;
