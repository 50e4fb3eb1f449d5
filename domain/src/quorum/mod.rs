//! Quorum consensus domain
//!
//! Turns the responses of one round into a single winning answer.
//!
//! # Flow
//!
//! ```text
//!   responses ──► ConsensusProcess::collect
//!                       │
//!                       ├─ 0 candidates ─► no-valid-contributions (no quorum)
//!                       ├─ 1 candidate  ─► unopposed (100%)
//!                       ▼
//!                 ballots (parse_ballot → Vote)
//!                       │
//!                       ▼
//!                 tally (simple / weighted) ─► ConsensusResult
//! ```

pub mod consensus;
pub mod parsing;
pub mod rule;
pub mod vote;

pub use consensus::{
    Candidate, ConsensusPhase, ConsensusProcess, ConsensusResult, NO_VALID_CONTRIBUTIONS, tally,
};
pub use parsing::{Ballot, parse_ballot};
pub use rule::{ConsensusRule, DEFAULT_THRESHOLD, VotingMethod};
pub use vote::{MAX_CONFIDENCE, MIN_CONFIDENCE, NEUTRAL_CONFIDENCE, Vote};
