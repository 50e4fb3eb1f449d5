//! Task entities

use crate::agent::selection::normalize_requirements;
use crate::core::error::CouncilError;
use crate::util::current_timestamp_ms;
use serde::{Deserialize, Serialize};

/// Identifier of a submitted task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a running task loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskLoopId(u64);

impl TaskLoopId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TaskLoopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "loop-{}", self.0)
    }
}

/// A task submitted to the council. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    /// Normalized capability tags the answering agents should carry
    pub required_capabilities: Vec<String>,
    /// Creation time in milliseconds since the Unix epoch
    pub created_at: u64,
}

impl Task {
    /// Create a task, rejecting blank descriptions.
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, CouncilError> {
        let description = description.into();
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return Err(CouncilError::InvalidTask(
                "description cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            id: TaskId::new(id),
            description: trimmed.to_string(),
            required_capabilities: Vec::new(),
            created_at: current_timestamp_ms(),
        })
    }

    pub fn with_required_capabilities<S: AsRef<str>>(mut self, capabilities: &[S]) -> Self {
        self.required_capabilities = normalize_requirements(capabilities);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_new_trims() {
        let task = Task::new("t1", "  Summarize the RFC  ").unwrap();
        assert_eq!(task.description, "Summarize the RFC");
        assert_eq!(task.id.as_str(), "t1");
        assert!(task.created_at > 0);
    }

    #[test]
    fn test_task_rejects_empty() {
        let err = Task::new("t1", "   ").unwrap_err();
        assert!(matches!(err, CouncilError::InvalidTask(_)));
    }

    #[test]
    fn test_required_capabilities_normalized() {
        let task = Task::new("t1", "x")
            .unwrap()
            .with_required_capabilities(&["Rust", "rust", "Review"]);
        assert_eq!(task.required_capabilities, vec!["rust", "review"]);
    }

    #[test]
    fn test_loop_id_display() {
        assert_eq!(TaskLoopId::new(7).to_string(), "loop-7");
    }
}
