//! Per-run execution context and the durable step primitive.
//!
//! `DurableContext` is the handle a workflow body uses to issue steps. Each
//! `step` call derives a positional key, consults the step store, and either
//! replays the committed result or executes the body and commits its output
//! before returning.
//!
//! # Step identity is positional
//!
//! Keys are `<name>_seq_<n>` where `n` is taken from a per-context counter,
//! not derived from the step's inputs. Replay after a crash is therefore
//! correct only when the workflow body issues steps in the same order on
//! every run. In-task concurrency via `tokio::join!`/`try_join!` keeps that
//! order (futures are polled in source order and the counter is taken
//! synchronously before a step's first await); issuing steps from spawned
//! tasks does not, and resuming such a workflow is unsupported. A
//! content-addressed scheme (keys incorporating step inputs) would lift the
//! ordering requirement, but identity here is deliberately purely
//! positional.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use durastep_types::error::{CodecError, StoreError};
use durastep_types::step::{StepRecord, StepStatus};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec;
use crate::store::StepStore;

// ---------------------------------------------------------------------------
// DurableContext
// ---------------------------------------------------------------------------

/// Execution context for one workflow run attempt.
///
/// Cheap to clone; all clones share the same sequence counter and store
/// handle. The counter starts at zero for every new context, including
/// resumes -- the store is the only state that survives a restart.
pub struct DurableContext<S> {
    inner: Arc<ContextInner<S>>,
}

struct ContextInner<S> {
    workflow_id: String,
    store: Arc<S>,
    sequence: AtomicU64,
}

impl<S> Clone for DurableContext<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: StepStore> DurableContext<S> {
    /// Create a fresh context bound to a workflow id and a shared store.
    pub fn new(workflow_id: impl Into<String>, store: Arc<S>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                workflow_id: workflow_id.into(),
                store,
                sequence: AtomicU64::new(0),
            }),
        }
    }

    /// The workflow id this context is bound to.
    pub fn workflow_id(&self) -> &str {
        &self.inner.workflow_id
    }

    /// Atomically advance the sequence counter and return the new value.
    ///
    /// Strictly increasing across all clones of one context; the first call
    /// returns 1.
    pub fn next_sequence(&self) -> u64 {
        self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Execute a step durably, or replay its committed result.
    ///
    /// The sequence counter advances unconditionally -- even on a cache hit
    /// -- so key assignment stays aligned with the original run. If a
    /// `Completed` record exists for the derived key, the body is not
    /// invoked and the stored output is decoded and returned. Otherwise the
    /// body runs; on success its output is committed before this call
    /// returns, so the result is recoverable even if the process dies
    /// immediately afterwards. A body error propagates without persisting
    /// anything, leaving the step unresolved for the next run attempt.
    pub async fn step<T, F, Fut>(&self, id: &str, body: F) -> Result<T, StepError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let seq = self.next_sequence();
        let step_key = format!("{id}_seq_{seq}");

        let existing = self
            .inner
            .store
            .get_step(&self.inner.workflow_id, &step_key)
            .await?;

        if let Some(record) = existing {
            if record.status == StepStatus::Completed {
                tracing::debug!(
                    workflow_id = self.inner.workflow_id.as_str(),
                    step = id,
                    key = step_key.as_str(),
                    "step already completed, replaying cached result"
                );
                return Ok(codec::decode(&record.output)?);
            }
        }

        tracing::debug!(
            workflow_id = self.inner.workflow_id.as_str(),
            step = id,
            key = step_key.as_str(),
            "executing step"
        );

        let value = body().await.map_err(StepError::Execution)?;

        let output = codec::encode(&value)?;
        self.inner
            .store
            .put_step(&StepRecord {
                workflow_id: self.inner.workflow_id.clone(),
                step_key: step_key.clone(),
                status: StepStatus::Completed,
                output,
            })
            .await?;

        tracing::debug!(
            workflow_id = self.inner.workflow_id.as_str(),
            step = id,
            key = step_key.as_str(),
            "step committed"
        );

        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// StepError
// ---------------------------------------------------------------------------

/// Failures surfaced by the step primitive.
///
/// None of these are retried by the engine; they propagate through the
/// workflow body to the run boundary.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// The persistent store failed.
    #[error("step store error: {0}")]
    Store(#[from] StoreError),

    /// Encoding a fresh result or decoding a cached one failed.
    #[error("step payload codec error: {0}")]
    Codec(#[from] CodecError),

    /// The step body itself failed. No record is persisted and the step is
    /// re-attempted in full on the next run of the same workflow id.
    #[error("step execution failed: {0}")]
    Execution(anyhow::Error),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use super::*;
    use crate::store::InMemoryStepStore;

    fn fresh_context(store: &Arc<InMemoryStepStore>, workflow_id: &str) -> DurableContext<InMemoryStepStore> {
        DurableContext::new(workflow_id, Arc::clone(store))
    }

    #[tokio::test]
    async fn step_runs_on_first_execution() {
        let store = Arc::new(InMemoryStepStore::new());
        let ctx = fresh_context(&store, "test-wf-001");
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let result = ctx
            .step("greet", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok("Hello, World!".to_string())
            })
            .await
            .unwrap();

        assert_eq!(result, "Hello, World!");
        assert_eq!(calls.load(Ordering::SeqCst), 1, "step should run exactly once");
    }

    #[tokio::test]
    async fn step_is_memoized_on_second_context() {
        let store = Arc::new(InMemoryStepStore::new());
        let calls = AtomicU32::new(0);
        let calls = &calls;

        let ctx = fresh_context(&store, "test-wf-001");
        let first = ctx
            .step("greet", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok("Hello, World!".to_string())
            })
            .await
            .unwrap();
        assert_eq!(first, "Hello, World!");

        // Fresh context over the same store simulates a restart: the
        // sequence counter resets, so the key is greet_seq_1 again.
        let ctx = fresh_context(&store, "test-wf-001");
        let second: String = ctx
            .step("greet", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok("This should NOT run".to_string())
            })
            .await
            .unwrap();

        assert_eq!(second, "Hello, World!", "should return cached result");
        assert_eq!(
            calls.load(Ordering::SeqCst),
            1,
            "body must not have been called again"
        );
    }

    #[tokio::test]
    async fn sequence_handles_loops() {
        let store = Arc::new(InMemoryStepStore::new());
        let ctx = fresh_context(&store, "loop-test-001");

        for i in 0..3u32 {
            let result = ctx
                .step("loop_step", || async move { anyhow::Ok(format!("iteration-{i}")) })
                .await
                .unwrap();
            assert_eq!(result, format!("iteration-{i}"));
        }

        let keys: Vec<String> = store
            .list_steps("loop-test-001")
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.step_key)
            .collect();
        assert_eq!(
            keys,
            vec!["loop_step_seq_1", "loop_step_seq_2", "loop_step_seq_3"],
            "each iteration gets its own key"
        );
    }

    #[tokio::test]
    async fn counter_advances_on_cache_hits() {
        let store = Arc::new(InMemoryStepStore::new());

        let ctx = fresh_context(&store, "align-001");
        ctx.step("first", || async { anyhow::Ok(1u32) }).await.unwrap();
        ctx.step("second", || async { anyhow::Ok(2u32) }).await.unwrap();

        // Resume: both cached steps still consume a sequence slot, so a new
        // trailing step lands on seq 3, not seq 1.
        let ctx = fresh_context(&store, "align-001");
        ctx.step("first", || async { anyhow::Ok(0u32) }).await.unwrap();
        ctx.step("second", || async { anyhow::Ok(0u32) }).await.unwrap();
        ctx.step("third", || async { anyhow::Ok(3u32) }).await.unwrap();

        let found = store.get_step("align-001", "third_seq_3").await.unwrap();
        assert!(found.is_some(), "new step must continue the key sequence");
    }

    #[tokio::test]
    async fn failed_body_persists_nothing() {
        let store = Arc::new(InMemoryStepStore::new());
        let ctx = fresh_context(&store, "fail-001");

        let result = ctx
            .step::<String, _, _>("flaky", || async {
                Err(anyhow::anyhow!("smtp unavailable"))
            })
            .await;

        match result {
            Err(StepError::Execution(e)) => assert!(e.to_string().contains("smtp")),
            other => panic!("expected execution error, got {other:?}"),
        }
        assert!(
            store.get_step("fail-001", "flaky_seq_1").await.unwrap().is_none(),
            "no record may be written for a failed step"
        );

        // The step stays unresolved: a retry on a fresh context executes it.
        let ctx = fresh_context(&store, "fail-001");
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = ctx
            .step("flaky", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                anyhow::Ok("recovered".to_string())
            })
            .await
            .unwrap();
        assert_eq!(result, "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn corrupt_cached_payload_surfaces_codec_error() {
        let store = Arc::new(InMemoryStepStore::new());
        store
            .put_step(&StepRecord {
                workflow_id: "codec-001".to_string(),
                step_key: "greet_seq_1".to_string(),
                status: StepStatus::Completed,
                output: "\"a string, not a number\"".to_string(),
            })
            .await
            .unwrap();

        let ctx = fresh_context(&store, "codec-001");
        let result = ctx.step::<u64, _, _>("greet", || async { anyhow::Ok(7) }).await;
        assert!(matches!(result, Err(StepError::Codec(_))));
    }

    #[tokio::test]
    async fn next_sequence_is_strictly_increasing() {
        let store = Arc::new(InMemoryStepStore::new());
        let ctx = fresh_context(&store, "seq-001");

        assert_eq!(ctx.next_sequence(), 1);
        assert_eq!(ctx.next_sequence(), 2);

        // Clones share the counter
        let clone = ctx.clone();
        assert_eq!(clone.next_sequence(), 3);
        assert_eq!(ctx.next_sequence(), 4);
    }
}
