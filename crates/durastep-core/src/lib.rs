//! Step memoization and replay engine.
//!
//! This crate defines the storage "port" (`StepStore`) that the
//! infrastructure layer implements, plus everything that runs on top of it:
//! - `codec` -- opaque encode/decode boundary for step payloads
//! - `store` -- the `StepStore` trait and an in-memory backend
//! - `context` -- per-run execution context with the durable step primitive
//! - `engine` -- workflow run lifecycle (start, resume, outcome reporting)
//!
//! It depends only on `durastep-types` -- never on sqlx or any IO crate.

pub mod codec;
pub mod context;
pub mod engine;
pub mod store;
