//! Agent Gateway port
//!
//! Defines how the application layer invokes worker agents. Prompt
//! transport and provider selection are the adapter's business; the core
//! only sees an opaque async capability.

use async_trait::async_trait;
use council_domain::AgentId;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while invoking an agent
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Failed to start agent: {0}")]
    SpawnFailed(String),

    #[error("Agent exited with {status}: {stderr}")]
    ExitFailure { status: String, stderr: String },

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Empty response")]
    EmptyResponse,

    #[error("Timeout")]
    Timeout,
}

/// Successful answer from an agent
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub content: String,
    pub latency_ms: u64,
}

impl AgentReply {
    pub fn new(content: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            content: content.into(),
            latency_ms,
        }
    }
}

/// Gateway for agent invocation
///
/// Implementations (adapters) live in the infrastructure layer. `timeout` is
/// a hint; callers enforce the deadline themselves.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    async fn invoke(
        &self,
        agent: &AgentId,
        prompt: &str,
        timeout: Duration,
    ) -> Result<AgentReply, GatewayError>;
}
