//! Step store trait definition and in-memory backend.
//!
//! `StepStore` is the storage interface for committed step records. The
//! infrastructure layer (durastep-infra) implements it with SQLite;
//! `InMemoryStepStore` is a non-durable backend for unit tests and
//! embedders that don't need crash recovery.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use durastep_types::error::StoreError;
use durastep_types::step::StepRecord;

// ---------------------------------------------------------------------------
// StepStore trait
// ---------------------------------------------------------------------------

/// Storage port for committed step records.
///
/// Implementations must make `put_step` fully durable before returning: a
/// record acknowledged by `put_step` is visible to every subsequent
/// `get_step`, including from other connections on the same backing store.
/// Single-record atomicity is sufficient; the engine never needs
/// multi-record transactions.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait StepStore: Send + Sync {
    /// Point lookup for `(workflow_id, step_key)`.
    ///
    /// Absence is `Ok(None)`, a normal outcome; `Err` means I/O failure or
    /// corruption.
    fn get_step(
        &self,
        workflow_id: &str,
        step_key: &str,
    ) -> impl std::future::Future<Output = Result<Option<StepRecord>, StoreError>> + Send;

    /// Durable upsert of a committed step record.
    ///
    /// Last write for a given key wins, though each key is written at most
    /// once per run lifetime under normal operation.
    fn put_step(
        &self,
        record: &StepRecord,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// All records for one workflow id, in insertion order.
    fn list_steps(
        &self,
        workflow_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<StepRecord>, StoreError>> + Send;
}

// ---------------------------------------------------------------------------
// InMemoryStepStore
// ---------------------------------------------------------------------------

/// Non-durable `StepStore` backed by a concurrent map.
///
/// Loses everything on drop, which makes it useful for tests that simulate
/// a crash by discarding the execution context while keeping the store, and
/// for callers that want memoization within a single process only.
#[derive(Default)]
pub struct InMemoryStepStore {
    /// `(workflow_id, step_key)` -> (insertion rank, record).
    steps: DashMap<(String, String), (u64, StepRecord)>,
    insertion: AtomicU64,
}

impl InMemoryStepStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StepStore for InMemoryStepStore {
    async fn get_step(
        &self,
        workflow_id: &str,
        step_key: &str,
    ) -> Result<Option<StepRecord>, StoreError> {
        let key = (workflow_id.to_string(), step_key.to_string());
        Ok(self.steps.get(&key).map(|entry| entry.value().1.clone()))
    }

    async fn put_step(&self, record: &StepRecord) -> Result<(), StoreError> {
        let key = (record.workflow_id.clone(), record.step_key.clone());
        match self.steps.entry(key) {
            Entry::Occupied(mut occupied) => {
                // Upsert keeps the original insertion rank
                occupied.get_mut().1 = record.clone();
            }
            Entry::Vacant(vacant) => {
                let rank = self.insertion.fetch_add(1, Ordering::SeqCst);
                vacant.insert((rank, record.clone()));
            }
        }
        Ok(())
    }

    async fn list_steps(&self, workflow_id: &str) -> Result<Vec<StepRecord>, StoreError> {
        let mut rows: Vec<(u64, StepRecord)> = self
            .steps
            .iter()
            .filter(|entry| entry.key().0 == workflow_id)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by_key(|(rank, _)| *rank);
        Ok(rows.into_iter().map(|(_, record)| record).collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
