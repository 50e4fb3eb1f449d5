//! Prompt domain
//!
//! Text sent to agents in the response and voting phases.

mod template;

pub use template::PromptTemplate;
