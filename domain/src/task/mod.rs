//! Task domain
//!
//! A [`Task`] is what the council answers. A task loop runs successive
//! rounds for one task and is identified by a [`TaskLoopId`].

mod entities;

pub use entities::{Task, TaskId, TaskLoopId};
