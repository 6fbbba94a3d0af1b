//! Infrastructure layer for durastep.
//!
//! Implements the `StepStore` port defined in `durastep-core` with SQLite
//! persistence: WAL mode, split read/write connection pools, and idempotent
//! schema creation so a backing file survives process restarts.

pub mod sqlite;
