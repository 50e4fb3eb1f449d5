//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into engine types by
//! [`FileConfig::engine_config`], [`FileConfig::registry`] and friends.

mod agents;
mod engine;
mod output;

pub use agents::FileAgentConfig;
pub use engine::{FileConsensusConfig, FileEngineConfig, FileSchedulerConfig};
pub use output::FileOutputConfig;

use crate::gateway::AgentCommand;
use council_application::{EngineConfig, LoopOptions};
use council_domain::{AgentId, AgentRegistry, ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub engine: FileEngineConfig,
    pub consensus: FileConsensusConfig,
    pub scheduler: FileSchedulerConfig,
    pub output: FileOutputConfig,
    /// Agent catalog
    pub agents: Vec<FileAgentConfig>,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Errors mean the engine cannot run with this configuration; warnings
    /// describe values that were corrected.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Engine-wide sections
        let (tier, tier_issue) = self.engine.parse_tier();
        issues.extend(tier_issue);
        issues.extend(self.engine.limit_issues());
        issues.extend(self.consensus.parse_rule().1);
        issues.extend(self.scheduler.interval_bounds().1);
        issues.extend(self.scheduler.parse_strategy().1);
        issues.extend(self.scheduler.limit_issues());

        // 2. Agent catalog
        if self.agents.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NoAgents,
                "no [[agents]] configured",
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.agents {
            let id = entry.id.trim();
            if id.is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::MissingCommand,
                    "an [[agents]] entry has no id",
                ));
                continue;
            }
            if !seen.insert(id) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::DuplicateAgentId,
                    format!("agents.{}: duplicate id, the later entry wins", id),
                ));
            }
            if entry.command.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::MissingCommand,
                    format!("agents.{}: command is empty", id),
                ));
            }

            let (agent, agent_issues) = entry.to_agent();
            issues.extend(agent_issues);
            if !tier.permits(agent.required_tier) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::AgentTierUnreachable,
                    format!(
                        "agents.{}: requires tier {} but the deployment is {}; it will never be selected",
                        id, agent.required_tier, tier
                    ),
                ));
            }
        }

        issues
    }

    /// Engine settings with invalid values replaced by defaults.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_consensus_rule(self.consensus.parse_rule().0)
            .with_max_consecutive_errors(self.engine.max_consecutive_errors)
            .with_ledger_capacity(self.engine.ledger_capacity)
            .with_retry_base_ms(self.engine.retry_base_ms)
            .with_interval_bounds(self.scheduler.interval_bounds().0)
    }

    /// Default per-task options from `[scheduler]`.
    pub fn loop_options(&self) -> LoopOptions {
        let mut options = LoopOptions::default()
            .with_max_agents(self.scheduler.max_agents)
            .with_per_agent_timeout(Duration::from_millis(self.scheduler.timeout_ms))
            .with_complexity(self.scheduler.complexity);
        if let Some(kind) = self.scheduler.parse_strategy().0 {
            options = options.with_strategy(kind);
        }
        options
    }

    /// Agent registry for the configured tier.
    pub fn registry(&self) -> AgentRegistry {
        AgentRegistry::with_agents(
            self.engine.parse_tier().0,
            self.agents
                .iter()
                .filter(|entry| !entry.id.trim().is_empty())
                .map(|entry| entry.to_agent().0),
        )
    }

    /// Command line for each configured agent.
    pub fn agent_commands(&self) -> HashMap<AgentId, AgentCommand> {
        self.agents
            .iter()
            .filter(|entry| !entry.id.trim().is_empty())
            .map(|entry| {
                (
                    AgentId::new(entry.id.trim()),
                    AgentCommand::new(entry.command.trim(), entry.args.clone()),
                )
            })
            .collect()
    }
}
