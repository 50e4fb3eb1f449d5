//! Agent domain
//!
//! Worker agents, the registry that leases them to rounds, and the
//! capability/performance scoring used to pick them.

pub mod entities;
pub mod registry;
pub mod selection;
pub mod value_objects;
