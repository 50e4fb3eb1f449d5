//! Engine-wide sections of the TOML config
//!
//! ```toml
//! [engine]
//! tier = "standard"
//! max_consecutive_errors = 5
//! ledger_capacity = 100
//! retry_base_ms = 5000
//! journal = "~/.local/share/agent-council/journal.jsonl"
//!
//! [consensus]
//! rule = "weighted:0.7"   # or "simple", "weighted", "simple:50%"
//! threshold = 0.7         # overrides the rule's threshold
//!
//! [scheduler]
//! min_interval_ms = 1000
//! max_interval_ms = 60000
//! strategy = "balanced"   # omit to let the rule table decide
//! max_agents = 3
//! timeout_ms = 30000
//! complexity = 0.5
//! ```

use council_domain::scheduling::{
    DEFAULT_RETRY_BASE_MS, IntervalBounds, MAX_INTERVAL_MS, MIN_INTERVAL_MS,
};
use council_domain::{
    ConfigIssue, ConfigIssueCode, ConsensusRule, DeploymentTier, StrategyKind,
    ledger::DEFAULT_LEDGER_CAPACITY,
};
use serde::{Deserialize, Serialize};

/// `[engine]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Deployment tier: "free", "standard", "premium"
    pub tier: String,
    pub max_consecutive_errors: u32,
    pub ledger_capacity: usize,
    pub retry_base_ms: u64,
    /// State journal path, replayed at startup
    pub journal: Option<String>,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            tier: "free".to_string(),
            max_consecutive_errors: 5,
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
            retry_base_ms: DEFAULT_RETRY_BASE_MS,
            journal: None,
        }
    }
}

impl FileEngineConfig {
    /// Parse the tier, falling back to `free` with an error issue.
    pub fn parse_tier(&self) -> (DeploymentTier, Option<ConfigIssue>) {
        match self.tier.parse() {
            Ok(tier) => (tier, None),
            Err(e) => (
                DeploymentTier::default(),
                Some(ConfigIssue::error(
                    ConfigIssueCode::InvalidTier,
                    format!("engine.tier: {}", e),
                )),
            ),
        }
    }

    pub(crate) fn limit_issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_consecutive_errors == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroLimit,
                "engine.max_consecutive_errors must be at least 1",
            ));
        }
        if self.ledger_capacity == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroLimit,
                "engine.ledger_capacity must be at least 1",
            ));
        }
        issues
    }
}

/// `[consensus]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsensusConfig {
    pub rule: String,
    pub threshold: Option<f64>,
}

impl Default for FileConsensusConfig {
    fn default() -> Self {
        Self {
            rule: "weighted".to_string(),
            threshold: None,
        }
    }
}

impl FileConsensusConfig {
    /// Parse the rule string, applying `threshold` on top.
    ///
    /// An unparseable rule falls back to the default rule.
    pub fn parse_rule(&self) -> (ConsensusRule, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut rule = match self.rule.parse::<ConsensusRule>() {
            Ok(rule) => rule,
            Err(e) => {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidConsensusRule,
                    format!("consensus.rule: {}", e),
                ));
                ConsensusRule::default()
            }
        };

        if let Some(threshold) = self.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidConsensusRule,
                    format!("consensus.threshold: {} is outside 0.0..=1.0", threshold),
                ));
            } else {
                rule = ConsensusRule::new(rule.method, threshold);
            }
        }

        (rule, issues)
    }
}

/// `[scheduler]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSchedulerConfig {
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    /// Fixed strategy for every round; unset means adaptive selection
    pub strategy: Option<String>,
    pub max_agents: usize,
    pub timeout_ms: u64,
    pub complexity: f64,
}

impl Default for FileSchedulerConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: MIN_INTERVAL_MS,
            max_interval_ms: MAX_INTERVAL_MS,
            strategy: None,
            max_agents: 3,
            timeout_ms: 30_000,
            complexity: 0.5,
        }
    }
}

impl FileSchedulerConfig {
    pub fn interval_bounds(&self) -> (IntervalBounds, Option<ConfigIssue>) {
        let issue = (self.min_interval_ms > self.max_interval_ms).then(|| {
            ConfigIssue::warning(
                ConfigIssueCode::IntervalBoundsInverted,
                format!(
                    "scheduler.min_interval_ms ({}) is larger than max_interval_ms ({}); swapping",
                    self.min_interval_ms, self.max_interval_ms
                ),
            )
        });
        (
            IntervalBounds::new(self.min_interval_ms, self.max_interval_ms),
            issue,
        )
    }

    pub fn parse_strategy(&self) -> (Option<StrategyKind>, Option<ConfigIssue>) {
        match self.strategy.as_deref().map(str::parse::<StrategyKind>) {
            None => (None, None),
            Some(Ok(kind)) => (Some(kind), None),
            Some(Err(e)) => (
                None,
                Some(ConfigIssue::warning(
                    ConfigIssueCode::InvalidStrategy,
                    format!("scheduler.strategy: {}; using adaptive selection", e),
                )),
            ),
        }
    }

    pub(crate) fn limit_issues(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_agents == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroLimit,
                "scheduler.max_agents must be at least 1",
            ));
        }
        if self.timeout_ms == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroLimit,
                "scheduler.timeout_ms must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.complexity) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::WeightOutOfRange,
                format!("scheduler.complexity {} clamped to 0.0..=1.0", self.complexity),
            ));
        }
        issues
    }
}
