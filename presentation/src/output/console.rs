//! Console output formatter for task loop results

use colored::Colorize;
use council_application::{LoopState, LoopStatus};
use council_domain::core::string::truncate;
use council_domain::{ConsensusResult, RoundOutcome};
use serde::Serialize;

/// What a finished loop reports: its final status and its ledger history.
#[derive(Debug, Clone, Serialize)]
pub struct LoopReport {
    pub status: LoopStatus,
    pub rounds: Vec<RoundOutcome>,
}

/// Formats loop results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format every round and the final consensus
    pub fn format(report: &LoopReport) -> String {
        let status = &report.status;
        let mut output = String::new();

        output.push_str(&Self::header("Agent Council Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}  {} {}  {} {}\n",
            "Loop:".cyan().bold(),
            status.loop_id,
            "Task:".cyan().bold(),
            status.task_id,
            "State:".cyan().bold(),
            Self::state_label(status)
        ));
        if let Some(strategy) = status.current_strategy {
            output.push_str(&format!("{} {}\n", "Strategy:".cyan().bold(), strategy));
        }

        output.push_str(&Self::section_header("Rounds"));
        if report.rounds.is_empty() {
            output.push_str(&format!("{}\n", "(no rounds recorded)".dimmed()));
        }
        for outcome in &report.rounds {
            output.push_str(&Self::round_line(outcome));
            output.push('\n');
        }

        if let Some(ref error) = status.last_error {
            output.push_str(&Self::section_header("Last Error"));
            let kind = status
                .last_error_kind
                .map(|k| k.as_str())
                .unwrap_or("unknown");
            output.push_str(&format!("{} ({})\n", error.red(), kind));
            if !status.recovery_actions.is_empty() {
                let actions: Vec<String> =
                    status.recovery_actions.iter().map(|a| a.to_string()).collect();
                output.push_str(&format!("{} {}\n", "Suggested:".dimmed(), actions.join(", ")));
            }
        }

        output.push_str(&Self::section_header("Consensus"));
        match status.last_consensus {
            Some(ref consensus) => output.push_str(&Self::consensus_block(consensus)),
            None => output.push_str(&format!("{}\n", "No consensus reached".yellow())),
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &LoopReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final consensus only (concise output)
    pub fn format_summary(report: &LoopReport) -> String {
        let status = &report.status;
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Agent Council Consensus ===".cyan().bold()
        ));
        output.push_str(&format!(
            "{} {} after {} round(s)\n\n",
            "State:".dimmed(),
            Self::state_label(status),
            status.iteration
        ));

        match status.last_consensus {
            Some(ref consensus) if consensus.has_winner() => {
                output.push_str(&Self::verdict(consensus));
                output.push_str("\n\n");
                output.push_str(&consensus.winning_content);
                output.push('\n');
            }
            _ => {
                output.push_str(&format!("{}\n", "No consensus reached".yellow()));
                if let Some(ref error) = status.last_error {
                    output.push_str(&format!("{} {}\n", "Last error:".dimmed(), error));
                }
            }
        }

        output
    }

    fn state_label(status: &LoopStatus) -> String {
        let label = status.state.as_str();
        match status.state {
            LoopState::Completed => label.green().to_string(),
            LoopState::Failed => label.red().to_string(),
            _ => label.yellow().to_string(),
        }
    }

    fn round_line(outcome: &RoundOutcome) -> String {
        let mark = if outcome.succeeded {
            "v".green()
        } else {
            "x".red()
        };
        format!(
            "  {} round {:>3}  quality {:.2}  performance {:.2}  {}ms  cost {:.1}  failed agents {}",
            mark,
            outcome.iteration + 1,
            outcome.quality,
            outcome.performance,
            outcome.duration_ms,
            outcome.cost_estimate,
            outcome.failed_agents
        )
    }

    fn verdict(consensus: &ConsensusResult) -> String {
        let quorum = if consensus.has_quorum {
            "quorum reached".green().bold()
        } else {
            "no quorum".yellow().bold()
        };
        format!(
            "{} {:.1}% for {} ({}, threshold {:.0}%)",
            quorum,
            consensus.confidence_percent,
            consensus
                .winner_agent_id
                .as_ref()
                .map(|id| id.as_str())
                .unwrap_or("-"),
            consensus.strategy_used,
            consensus.threshold * 100.0
        )
    }

    fn consensus_block(consensus: &ConsensusResult) -> String {
        let mut output = String::new();
        output.push_str(&Self::verdict(consensus));
        output.push('\n');
        output.push_str(&format!(
            "{} {} from {} ballot(s)\n",
            "Votes:".dimmed(),
            consensus.vote_summary(),
            consensus.total_votes
        ));
        if consensus.has_winner() {
            output.push_str(&format!(
                "\n{}\n{}\n",
                "── Winning answer ──".yellow().bold(),
                Self::indent(&truncate(&consensus.winning_content, 4_000), "  ")
            ));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{
        AgentId, ConsensusRule, RoundOutcome, StrategyKind, TaskId, TaskLoopId, VotingMethod,
    };

    fn report() -> LoopReport {
        let mut status = LoopStatus::new(TaskLoopId::new(1), TaskId::new("t-1"), 3);
        status.state = LoopState::Completed;
        status.iteration = 1;
        status.current_strategy = Some(StrategyKind::Balanced);
        status.last_consensus = Some(ConsensusResult {
            winner_agent_id: Some(AgentId::new("analyst")),
            winning_content: "Use LRU".to_string(),
            winning_index: Some(0),
            confidence_percent: 75.0,
            has_quorum: true,
            vote_counts: vec![3, 1],
            weighted_scores: vec![2.4, 0.8],
            strategy_used: VotingMethod::Weighted,
            threshold: ConsensusRule::default().threshold,
            total_votes: 4,
        });
        LoopReport {
            status,
            rounds: vec![RoundOutcome {
                task_loop_id: TaskLoopId::new(1),
                iteration: 0,
                quality: 0.8,
                duration_ms: 1_500,
                cost_estimate: 3.0,
                performance: 0.7,
                voter_accuracy: Some(0.75),
                failed_agents: 0,
                succeeded: true,
                timestamp: 0,
            }],
        }
    }

    #[test]
    fn test_summary_shows_winning_answer() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format_summary(&report());
        assert!(output.contains("quorum reached 75.0% for analyst"));
        assert!(output.contains("Use LRU"));
        assert!(output.contains("completed after 1 round(s)"));
    }

    #[test]
    fn test_full_lists_rounds_and_votes() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format(&report());
        assert!(output.contains("round   1"));
        assert!(output.contains("Votes: [3 1] from 4 ballot(s)"));
        assert!(output.contains("  Use LRU"));
    }

    #[test]
    fn test_json_is_parseable() {
        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&report())).unwrap();
        assert_eq!(json["status"]["state"], "completed");
        assert_eq!(json["status"]["last_consensus"]["winning_content"], "Use LRU");
        assert_eq!(json["rounds"][0]["quality"], 0.8);
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
