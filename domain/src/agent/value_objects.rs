//! Agent value objects - identifiers, capability tags and deployment tiers.

use serde::{Deserialize, Serialize};

/// Identifier of a worker agent in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Normalize a capability tag for comparison (trimmed, lowercase).
pub fn normalize_capability(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Service tier of the deployment, used as a hard prerequisite filter.
///
/// An agent whose `required_tier` is above the deployment tier is excluded
/// from selection entirely (it is never scored).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentTier {
    #[default]
    Free,
    Standard,
    Premium,
}

impl DeploymentTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentTier::Free => "free",
            DeploymentTier::Standard => "standard",
            DeploymentTier::Premium => "premium",
        }
    }

    /// Whether a deployment at this tier can run an agent requiring `required`.
    pub fn permits(&self, required: DeploymentTier) -> bool {
        *self >= required
    }
}

impl std::fmt::Display for DeploymentTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DeploymentTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(DeploymentTier::Free),
            "standard" => Ok(DeploymentTier::Standard),
            "premium" | "paid" => Ok(DeploymentTier::Premium),
            other => Err(format!(
                "Unknown tier: {}. Valid: free, standard, premium",
                other
            )),
        }
    }
}
