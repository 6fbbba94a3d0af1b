//! Observability setup for durastep.

pub mod tracing_setup;
