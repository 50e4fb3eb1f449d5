//! Scripted in-memory gateway for use case tests.

use crate::ports::agent_gateway::{AgentGateway, AgentReply, GatewayError};
use async_trait::async_trait;
use council_domain::{Agent, AgentId};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// How a scripted agent behaves for one kind of prompt.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Reply with `content` after `delay_ms`
    Answer(String, u64),
    /// Fail with the given message
    Fail(String),
    /// Never reply within any reasonable deadline
    Hang,
}

pub fn answer(content: &str) -> Behavior {
    Behavior::Answer(content.to_string(), 10)
}

/// JSON ballot for a 1-based choice.
pub fn ballot(choice: usize, confidence: u32) -> Behavior {
    Behavior::Answer(
        format!(r#"{{"choice": {}, "confidence": {}}}"#, choice, confidence),
        5,
    )
}

/// Gateway whose agents follow a script.
///
/// Prompts containing "Candidate answers:" are ballot requests; everything
/// else is a task prompt. Unscripted agents fail.
#[derive(Default)]
pub struct ScriptedGateway {
    answers: Mutex<HashMap<AgentId, Behavior>>,
    ballots: Mutex<HashMap<AgentId, Behavior>>,
    calls: Mutex<Vec<(AgentId, bool)>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_task(self, agent: &str, behavior: Behavior) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(AgentId::new(agent), behavior);
        self
    }

    pub fn on_ballot(self, agent: &str, behavior: Behavior) -> Self {
        self.ballots
            .lock()
            .unwrap()
            .insert(AgentId::new(agent), behavior);
        self
    }

    pub fn set_task(&self, agent: &str, behavior: Behavior) {
        self.answers
            .lock()
            .unwrap()
            .insert(AgentId::new(agent), behavior);
    }

    /// Number of task (not ballot) invocations so far.
    pub fn task_calls(&self) -> usize {
        self.calls.lock().unwrap().iter().filter(|(_, b)| !b).count()
    }

    pub fn ballot_calls(&self) -> usize {
        self.calls.lock().unwrap().iter().filter(|(_, b)| *b).count()
    }
}

#[async_trait]
impl AgentGateway for ScriptedGateway {
    async fn invoke(
        &self,
        agent: &AgentId,
        prompt: &str,
        _timeout: Duration,
    ) -> Result<AgentReply, GatewayError> {
        let is_ballot = prompt.contains("Candidate answers:");
        self.calls.lock().unwrap().push((agent.clone(), is_ballot));
        let behavior = if is_ballot {
            self.ballots.lock().unwrap().get(agent).cloned()
        } else {
            self.answers.lock().unwrap().get(agent).cloned()
        };

        match behavior {
            Some(Behavior::Answer(content, delay_ms)) => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(AgentReply::new(content, delay_ms))
            }
            Some(Behavior::Fail(message)) => Err(GatewayError::RequestFailed(message)),
            Some(Behavior::Hang) => {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
                Ok(AgentReply::new("too late", 3_600_000))
            }
            None => Err(GatewayError::UnknownAgent(agent.to_string())),
        }
    }
}

pub fn agent(id: &str) -> Agent {
    Agent::new(id, "generalist")
}
