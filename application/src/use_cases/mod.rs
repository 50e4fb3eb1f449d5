//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod build_consensus;
pub mod engine;
pub mod run_round;
pub(crate) mod shared;
pub mod task_loop;

#[cfg(test)]
mod test_support;
