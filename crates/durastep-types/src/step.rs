//! Step record types: the durable unit of memoization.
//!
//! A `StepRecord` is one committed step result, keyed by
//! `(workflow_id, step_key)`. Records are written exactly once per key under
//! normal operation and never mutated or deleted by the engine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StepStatus
// ---------------------------------------------------------------------------

/// Status of a durably recorded step.
///
/// Only successful completions are ever persisted, so this enum has a single
/// variant. A step that failed or was interrupted leaves no record at all and
/// is re-attempted in full on the next run of the same workflow id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    Completed,
}

impl StepStatus {
    /// The persisted text form (`COMPLETED`).
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Completed => "COMPLETED",
        }
    }
}

// ---------------------------------------------------------------------------
// StepRecord
// ---------------------------------------------------------------------------

/// One committed step result.
///
/// `step_key` is derived as `<step_name>_seq_<n>` where `n` is the 1-based
/// position of the invocation among all step invocations issued by the run
/// attempt, in issuance order. `output` holds the JSON-encoded return value
/// of the step body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Caller-chosen workflow id; the partition key for all of a run's steps.
    pub workflow_id: String,
    /// Positional key, unique within the workflow id.
    pub step_key: String,
    /// Completion status.
    pub status: StepStatus,
    /// JSON-encoded step return value.
    pub output: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
