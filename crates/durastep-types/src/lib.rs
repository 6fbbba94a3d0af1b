//! Shared domain types for durastep.
//!
//! This crate contains the types that cross the engine's crate boundaries:
//! step records, run status, and the storage/codec error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod error;
pub mod run;
pub mod step;
