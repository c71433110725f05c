// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reference in-memory state store: three maps behind a single
//! exclusive lock, exposed via `Lock/Unlock` so a manager job can bracket
//! several operations as one transaction.
//!
//! In Rust the Lock/Unlock pairing is realized as RAII: [`InMemoryStore::lock`]
//! returns a [`tokio::sync::MutexGuard`] whose inherent methods are the
//! store's CRUD surface, and the lock releases when the guard drops at the
//! end of the caller's scope (whether that scope is a single accessor call
//! or an entire manager job).

use crate::StoreError;
use fleet_core::{WorkerHandle, WorkerId, WorkloadId, WorkloadRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// The store's mutable state. Every method here assumes the caller already
/// holds the store's lock — none of them lock internally.
#[derive(Default)]
pub struct StoreState {
    workers: HashMap<WorkerId, Arc<dyn WorkerHandle>>,
    workloads: HashMap<WorkloadId, WorkloadRecord>,
    associations: HashMap<WorkloadId, WorkerId>,
}

impl StoreState {
    pub fn get_all_workers(&self) -> Vec<Arc<dyn WorkerHandle>> {
        self.workers.values().cloned().collect()
    }

    pub fn get_worker(&self, id: &WorkerId) -> Option<Arc<dyn WorkerHandle>> {
        self.workers.get(id).cloned()
    }

    /// Idempotent: a second add for the same id simply replaces the entry.
    /// Duplicate rejection, where wanted, is the caller's responsibility.
    pub fn add_worker(&mut self, id: WorkerId, worker: Arc<dyn WorkerHandle>) {
        self.workers.insert(id, worker);
    }

    /// Like `add_worker`, but rejects a duplicate id instead of replacing it.
    pub fn try_add_worker(&mut self, id: WorkerId, worker: Arc<dyn WorkerHandle>) -> Result<(), StoreError> {
        if self.workers.contains_key(&id) {
            return Err(StoreError::WorkerExists);
        }
        self.workers.insert(id, worker);
        Ok(())
    }

    /// Like `get_worker`, but signals absence instead of returning `None`.
    pub fn require_worker(&self, id: &WorkerId) -> Result<Arc<dyn WorkerHandle>, StoreError> {
        self.workers.get(id).cloned().ok_or(StoreError::WorkerNotFound)
    }

    pub fn delete_worker(&mut self, id: &WorkerId) {
        self.workers.remove(id);
    }

    pub fn get_all_workloads(&self) -> Vec<WorkloadRecord> {
        self.workloads.values().cloned().collect()
    }

    pub fn get_workload(&self, id: &WorkloadId) -> Option<WorkloadRecord> {
        self.workloads.get(id).cloned()
    }

    pub fn add_workload(&mut self, wl: WorkloadRecord) {
        self.workloads.insert(wl.id.clone(), wl);
    }

    /// Like `add_workload`, but rejects a duplicate id instead of replacing it.
    pub fn try_add_workload(&mut self, wl: WorkloadRecord) -> Result<(), StoreError> {
        if self.workloads.contains_key(&wl.id) {
            return Err(StoreError::WorkloadExists);
        }
        self.workloads.insert(wl.id.clone(), wl);
        Ok(())
    }

    /// Like `get_workload`, but signals absence instead of returning `None`.
    pub fn require_workload(&self, id: &WorkloadId) -> Result<WorkloadRecord, StoreError> {
        self.workloads.get(id).cloned().ok_or(StoreError::WorkloadNotFound)
    }

    pub fn update_workload(&mut self, wl: WorkloadRecord) {
        self.workloads.insert(wl.id.clone(), wl);
    }

    pub fn delete_workload(&mut self, id: &WorkloadId) {
        self.workloads.remove(id);
    }

    pub fn get_association(&self, wl: &WorkloadId) -> Option<WorkerId> {
        self.associations.get(wl).cloned()
    }

    /// Like `get_association`, but signals absence instead of returning `None`.
    pub fn require_association(&self, wl: &WorkloadId) -> Result<WorkerId, StoreError> {
        self.associations.get(wl).cloned().ok_or(StoreError::AssociationNotFound)
    }

    pub fn get_associations(&self, w: &WorkerId) -> Vec<WorkloadId> {
        self.associations
            .iter()
            .filter(|entry| entry.1 == w)
            .map(|entry| entry.0.clone())
            .collect()
    }

    pub fn associate(&mut self, wl: &WorkloadId, w: &WorkerId) {
        self.associations.insert(wl.clone(), w.clone());
    }

    pub fn disassociate(&mut self, wl: &WorkloadId) {
        self.associations.remove(wl);
    }
}

/// The reference state store. One exclusive lock guards all three maps.
pub struct InMemoryStore {
    inner: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreState::default()),
        }
    }

    /// Acquire the store's exclusive lock. The returned guard is the
    /// transaction: hold it across every operation that must be atomic
    /// with respect to other lockers, including a manager job's entire run.
    pub async fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.lock().await
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
