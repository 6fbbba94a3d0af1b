//! Workflow run lifecycle.
//!
//! `WorkflowEngine` owns the shared step store and runs one workflow body
//! per `run_workflow` call. It is the single recovery boundary: a body
//! error is caught here, classified, and reported -- never retried, never
//! rolled back. Re-invoking `run_workflow` with the same workflow id is the
//! supported resume path; already-committed steps replay from the store.

use std::sync::Arc;

use durastep_types::run::RunStatus;

use crate::context::DurableContext;
use crate::store::StepStore;

// ---------------------------------------------------------------------------
// RunOutcome
// ---------------------------------------------------------------------------

/// Result of one workflow run attempt.
///
/// Nothing run-level is persisted; a failed outcome leaves every committed
/// step record in place for the next attempt.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The workflow id the attempt ran under.
    pub workflow_id: String,
    /// Terminal classification of the attempt.
    pub status: RunStatus,
    /// Error chain carried by a failed attempt.
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// WorkflowEngine
// ---------------------------------------------------------------------------

/// Starts or resumes workflow runs against a shared step store.
///
/// Generic over `S: StepStore` so it works with any storage backend
/// (SQLite, in-memory).
pub struct WorkflowEngine<S> {
    store: Arc<S>,
}

impl<S: StepStore> WorkflowEngine<S> {
    /// Create an engine owning the given store.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Create an engine over an already-shared store.
    pub fn with_store(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Shared handle to the underlying store.
    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    /// Start or resume the workflow identified by `workflow_id`.
    ///
    /// Constructs a fresh execution context (sequence counter at zero) and
    /// invokes the body. Steps the body issued in a previous attempt replay
    /// from the store; everything after the last committed step executes for
    /// the first time. The body's error, if any, is caught at this boundary
    /// only and reported in the returned outcome.
    pub async fn run_workflow<F, Fut>(&self, workflow_id: &str, body: F) -> RunOutcome
    where
        F: FnOnce(DurableContext<S>) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        tracing::info!(workflow_id, "starting or resuming workflow run");

        let ctx = DurableContext::new(workflow_id, Arc::clone(&self.store));

        match body(ctx).await {
            Ok(()) => {
                tracing::info!(workflow_id, "workflow run completed");
                RunOutcome {
                    workflow_id: workflow_id.to_string(),
                    status: RunStatus::Succeeded,
                    error: None,
                }
            }
            Err(err) => {
                let error = format!("{err:#}");
                tracing::error!(workflow_id, error = error.as_str(), "workflow run failed");
                RunOutcome {
                    workflow_id: workflow_id.to_string(),
                    status: RunStatus::Failed,
                    error: Some(error),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
