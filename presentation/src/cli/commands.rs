//! CLI command definitions

use clap::{Parser, ValueEnum};
use council_domain::StrategyKind;
use std::path::PathBuf;

/// Output format for loop results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every round plus the final consensus
    Full,
    /// Only the final consensus
    Summary,
    /// JSON output
    Json,
}

impl From<OutputFormat> for council_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => council_domain::OutputFormat::Full,
            OutputFormat::Summary => council_domain::OutputFormat::Summary,
            OutputFormat::Json => council_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for agent-council
#[derive(Parser, Debug)]
#[command(name = "agent-council")]
#[command(author, version, about = "Agent Council - independent agents answer, vote and reach consensus")]
#[command(long_about = r#"
Agent Council runs a task through repeated rounds of a council of agents.

Each round has two phases:
1. Response: the selected agents answer the task in parallel
2. Voting: every agent picks the best answer; the winner needs a quorum

Between rounds an adaptive scheduler picks a timing strategy and the
next-round interval; failed rounds are retried with backoff.

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/agent-council/config.toml   Global config

Example:
  agent-council "Pick a cache eviction policy for a CDN edge"
  agent-council -c rust -c design --rounds 3 "Design the plugin API"
  agent-council --stop-on-quorum --strategy conservative -o json "Review this RFC"
"#)]
pub struct Cli {
    /// The task for the council
    pub task: Option<String>,

    /// Capabilities the answering agents should have (repeatable)
    #[arg(short = 'c', long = "capability", value_name = "TAG")]
    pub capabilities: Vec<String>,

    /// Agents per round
    #[arg(long, value_name = "N")]
    pub max_agents: Option<usize>,

    /// Per-agent response timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Fixed timing strategy (aggressive, balanced, conservative, adaptive, experimental)
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<StrategyKind>,

    /// Stop after this many successful rounds (default: 1)
    #[arg(long, value_name = "N")]
    pub rounds: Option<u32>,

    /// Keep running rounds until one reaches quorum
    #[arg(long)]
    pub stop_on_quorum: bool,

    /// Task complexity from 0.0 to 1.0, used for strategy selection
    #[arg(long, value_name = "X")]
    pub complexity: Option<f64>,

    /// Allow the experimental strategy
    #[arg(long)]
    pub experimental: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// State journal to replay at startup and append to
    #[arg(long, value_name = "PATH")]
    pub journal: Option<PathBuf>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Number of rounds to run. Without `--rounds`, `--stop-on-quorum`
    /// runs until quorum and everything else runs a single round.
    pub fn max_rounds(&self) -> Option<u32> {
        match (self.rounds, self.stop_on_quorum) {
            (Some(rounds), _) => Some(rounds.max(1)),
            (None, true) => None,
            (None, false) => Some(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "agent-council",
            "-c",
            "rust",
            "--capability",
            "design",
            "--strategy",
            "fast",
            "--rounds",
            "3",
            "-o",
            "json",
            "-vv",
            "Design the plugin API",
        ])
        .unwrap();

        assert_eq!(cli.task.as_deref(), Some("Design the plugin API"));
        assert_eq!(cli.capabilities, vec!["rust", "design"]);
        assert_eq!(cli.strategy, Some(StrategyKind::Aggressive));
        assert_eq!(cli.max_rounds(), Some(3));
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_rounds_default() {
        let cli = Cli::try_parse_from(["agent-council", "task"]).unwrap();
        assert_eq!(cli.max_rounds(), Some(1));

        let cli = Cli::try_parse_from(["agent-council", "--stop-on-quorum", "task"]).unwrap();
        assert_eq!(cli.max_rounds(), None);
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let result = Cli::try_parse_from(["agent-council", "--strategy", "reckless", "task"]);
        assert!(result.is_err());
    }
}
