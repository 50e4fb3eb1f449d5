//! JSONL file writer and reader for the state journal.
//!
//! Each [`JournalEntry`] is serialized as a single JSON line with a `type`
//! field and a `timestamp`, appended to the file via a buffered writer.
//! [`replay`] reads the file back so the engine can rebuild its ledger and
//! agent success rates after a restart.

use council_application::{JournalEntry, StateJournal};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::warn;

/// Errors raised while opening or replaying a journal
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Could not open journal {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read journal {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Entries read back from a journal file
#[derive(Debug, Default)]
pub struct Replay {
    pub entries: Vec<JournalEntry>,
    /// Lines that were not valid journal records
    pub skipped_lines: usize,
}

/// Append-only JSONL journal.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record and
/// on `Drop`.
pub struct JsonlStateJournal {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlStateJournal {
    /// Open the journal for appending.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref();
        let open_error = |source| JournalError::Open {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(open_error)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_error)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateJournal for JsonlStateJournal {
    fn append(&self, entry: &JournalEntry) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut record = match serde_json::to_value(entry) {
            Ok(value) => value,
            Err(e) => {
                warn!("Could not serialize journal entry: {}", e);
                return;
            }
        };
        if let serde_json::Value::Object(ref mut map) = record {
            map.insert(
                "timestamp".to_string(),
                serde_json::Value::String(timestamp),
            );
        }

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush()) {
            warn!("Could not write journal {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for JsonlStateJournal {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

/// Read every entry of a journal file, oldest first.
///
/// A missing file is an empty journal. Malformed lines (for example a line
/// cut short by a crash) are skipped and counted.
pub fn replay(path: impl AsRef<Path>) -> Result<Replay, JournalError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Replay::default()),
        Err(source) => {
            return Err(JournalError::Open {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut replay = Replay::default();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| JournalError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<JournalEntry>(&line) {
            Ok(entry) => replay.entries.push(entry),
            Err(e) => {
                warn!("Skipping journal line {}: {}", number + 1, e);
                replay.skipped_lines += 1;
            }
        }
    }
    Ok(replay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{AgentId, RoundOutcome, TaskLoopId, VoteRecord};

    fn outcome(loop_id: u64, iteration: u32) -> RoundOutcome {
        RoundOutcome {
            task_loop_id: TaskLoopId::new(loop_id),
            iteration,
            quality: 0.9,
            duration_ms: 1_200,
            cost_estimate: 3.0,
            performance: 0.8,
            voter_accuracy: Some(1.0),
            failed_agents: 0,
            succeeded: true,
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_journal_writes_tagged_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/journal.jsonl");
        let journal = JsonlStateJournal::open(&path).unwrap();

        journal.append(&JournalEntry::RoundOutcome {
            outcome: outcome(1, 0),
        });
        journal.append(&JournalEntry::AgentSuccessRate {
            agent_id: AgentId::new("critic"),
            success_rate: 0.5,
            vote_record: VoteRecord {
                correct: 1,
                total: 2,
            },
        });
        drop(journal);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.trim().lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "round_outcome");
        assert_eq!(first["outcome"]["task_loop_id"], 1);
        assert!(first.get("timestamp").is_some());

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["type"], "agent_success_rate");
        assert_eq!(second["agent_id"], "critic");
    }

    #[test]
    fn test_replay_round_trips_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");

        {
            let journal = JsonlStateJournal::open(&path).unwrap();
            journal.append(&JournalEntry::RoundOutcome {
                outcome: outcome(1, 0),
            });
        }
        {
            // reopening appends instead of truncating
            let journal = JsonlStateJournal::open(&path).unwrap();
            journal.append(&JournalEntry::RoundOutcome {
                outcome: outcome(1, 1),
            });
        }

        let replay = replay(&path).unwrap();
        assert_eq!(replay.skipped_lines, 0);
        assert_eq!(
            replay.entries,
            vec![
                JournalEntry::RoundOutcome {
                    outcome: outcome(1, 0)
                },
                JournalEntry::RoundOutcome {
                    outcome: outcome(1, 1)
                },
            ]
        );
    }

    #[test]
    fn test_replay_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.jsonl");
        let good = serde_json::to_string(&JournalEntry::RoundOutcome {
            outcome: outcome(2, 0),
        })
        .unwrap();
        std::fs::write(&path, format!("{}\n{{\"type\":\"round_out\n\n", good)).unwrap();

        let replay = replay(&path).unwrap();
        assert_eq!(replay.entries.len(), 1);
        assert_eq!(replay.skipped_lines, 1);
    }

    #[test]
    fn test_replay_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let replay = replay(dir.path().join("absent.jsonl")).unwrap();
        assert!(replay.entries.is_empty());
    }
}
