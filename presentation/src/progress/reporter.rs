//! Progress reporting for task loops

use colored::Colorize;
use council_application::{ProgressNotifier, RoundPhase};
use council_domain::{AgentId, ConsensusResult, ErrorKind, StrategyKind, TaskLoopId};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Reports progress with one progress bar per round phase
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
    }

    fn phase_display_name(phase: RoundPhase) -> &'static str {
        match phase {
            RoundPhase::Response => "Responses",
            RoundPhase::Voting => "Voting   ",
        }
    }

    fn println(&self, line: String) {
        // falls back to stderr when the bars are hidden
        if self.multi.println(&line).is_err() {
            eprintln!("{}", line);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_phase_start(&self, _loop_id: TaskLoopId, phase: RoundPhase, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(Self::phase_display_name(phase));
        pb.set_message("Starting...");
        pb.enable_steady_tick(Duration::from_millis(120));

        *self.phase_bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_task_complete(&self, _loop_id: TaskLoopId, _phase: RoundPhase, agent: &AgentId, success: bool) {
        if let Some(pb) = self
            .phase_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), agent)
            } else {
                format!("{} {}", "x".red(), agent)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn on_phase_complete(&self, _loop_id: TaskLoopId, phase: RoundPhase) {
        if let Some(pb) = self
            .phase_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.finish_with_message(format!("{} complete!", phase.as_str().green()));
        }
    }

    fn on_round_start(&self, loop_id: TaskLoopId, iteration: u32, strategy: StrategyKind) {
        self.println(format!(
            "{} {} round {} ({} strategy)",
            "->".cyan(),
            loop_id,
            iteration,
            strategy
        ));
    }

    fn on_consensus(&self, _loop_id: TaskLoopId, _iteration: u32, result: &ConsensusResult) {
        let verdict = if result.has_quorum {
            "quorum".green().bold()
        } else {
            "no quorum".yellow().bold()
        };
        self.println(format!(
            "   {} at {:.1}% {}",
            verdict,
            result.confidence_percent,
            result.vote_summary().dimmed()
        ));
    }

    fn on_retry_scheduled(&self, _loop_id: TaskLoopId, kind: ErrorKind, delay: Duration) {
        self.println(format!(
            "   {} round failed ({}), retrying in {:.1}s",
            "x".red(),
            kind,
            delay.as_secs_f64()
        ));
    }

    fn on_next_round(&self, _loop_id: TaskLoopId, delay: Duration) {
        self.println(format!(
            "   {} next round in {:.1}s",
            "..".dimmed(),
            delay.as_secs_f64()
        ));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_phase_start(&self, _loop_id: TaskLoopId, phase: RoundPhase, total_tasks: usize) {
        eprintln!(
            "  {} {} ({} agents)",
            "->".cyan(),
            phase.as_str().bold(),
            total_tasks
        );
    }

    fn on_task_complete(&self, _loop_id: TaskLoopId, _phase: RoundPhase, agent: &AgentId, success: bool) {
        if success {
            eprintln!("    {} {}", "v".green(), agent);
        } else {
            eprintln!("    {} {} (failed)", "x".red(), agent);
        }
    }

    fn on_phase_complete(&self, _loop_id: TaskLoopId, _phase: RoundPhase) {}

    fn on_round_start(&self, loop_id: TaskLoopId, iteration: u32, strategy: StrategyKind) {
        eprintln!("{} round {} ({})", loop_id, iteration, strategy);
    }

    fn on_consensus(&self, _loop_id: TaskLoopId, _iteration: u32, result: &ConsensusResult) {
        eprintln!(
            "  consensus {:.1}% (quorum: {})",
            result.confidence_percent, result.has_quorum
        );
    }

    fn on_retry_scheduled(&self, _loop_id: TaskLoopId, kind: ErrorKind, delay: Duration) {
        eprintln!("  retry in {}ms ({})", delay.as_millis(), kind);
    }
}
