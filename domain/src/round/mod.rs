//! Round domain
//!
//! One round fans a task out to the selected agents and gathers whatever
//! arrives before the deadline.

pub mod value_objects;

pub use value_objects::{AgentResponse, RoundReport};
