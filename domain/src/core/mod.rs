//! Core domain concepts shared across all subdomains.
//!
//! - [`error::CouncilError`]: failure taxonomy of the consensus core
//! - [`string::truncate`]: log-friendly previews of agent output

pub mod error;
pub mod string;
