//! State journal: persisted round outcomes and agent success rates.
//!
//! Provides [`JsonlStateJournal`], a JSONL file writer that implements the
//! [`StateJournal`](council_application::StateJournal) port, and [`replay`]
//! to read it back at startup.

mod jsonl_journal;

pub use jsonl_journal::{JournalError, JsonlStateJournal, Replay, replay};
