//! Port for the persisted state journal.
//!
//! The journal records what the engine needs to rebuild its ledger and
//! agent success rates after a restart. It is separate from `tracing`
//! diagnostics: tracing is for humans, the journal is replayed by the engine.

use council_domain::{AgentId, RoundOutcome, VoteRecord};
use serde::{Deserialize, Serialize};

/// One journal record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JournalEntry {
    /// A ledger entry, keyed by its task loop id
    RoundOutcome { outcome: RoundOutcome },
    /// An agent's updated success rate after a consensus
    AgentSuccessRate {
        agent_id: AgentId,
        success_rate: f64,
        vote_record: VoteRecord,
    },
}

/// Port for appending to the state journal.
///
/// `append` is synchronous and non-fallible so journaling never disrupts a
/// running loop; adapters log and drop write failures.
pub trait StateJournal: Send + Sync {
    fn append(&self, entry: &JournalEntry);
}

/// No-op implementation for tests and when journaling is disabled.
pub struct NoJournal;

impl StateJournal for NoJournal {
    fn append(&self, _entry: &JournalEntry) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_tagged() {
        let entry = JournalEntry::AgentSuccessRate {
            agent_id: AgentId::new("reviewer"),
            success_rate: 0.5,
            vote_record: VoteRecord {
                correct: 1,
                total: 2,
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "agent_success_rate");
        assert_eq!(json["agent_id"], "reviewer");
        assert_eq!(json["vote_record"]["total"], 2);

        let back: JournalEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
