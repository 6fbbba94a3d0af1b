//! Run-level status.
//!
//! A run's aggregate state is never persisted; it is always derived by
//! replaying the workflow body against the step records. This enum only
//! classifies the outcome of one run attempt in memory.

use serde::{Deserialize, Serialize};

/// Terminal classification of one workflow run attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The workflow body returned without error.
    Succeeded,
    /// The workflow body raised; committed steps are kept and the same
    /// workflow id can be re-run to resume.
    Failed,
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Succeeded)
    }
}
