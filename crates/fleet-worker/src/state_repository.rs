// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External state sink a worker reports workload lifecycle into.
//!
//! The default in-memory implementation is a reference: a production
//! deployment supplies its own, keyed however it likes. The composite
//! `"{workerId}.{workloadName}"` key below is the reference scheme only.

use parking_lot::Mutex;
use std::collections::HashSet;

pub trait StateRepository: Send + Sync {
    fn register_worker(&self, worker_id: &str);

    fn register_workload(&self, workload: &str, worker_id: &str);

    fn delete_workload(&self, workload: &str, worker_id: &str);

    fn update_workload(&self, workload: &str, worker_id: &str);
}

#[derive(Default)]
pub struct InMemoryStateRepository {
    keys: Mutex<HashSet<String>>,
}

impl InMemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(workload: &str, worker_id: &str) -> String {
        format!("{worker_id}.{workload}")
    }

    pub fn contains(&self, workload: &str, worker_id: &str) -> bool {
        self.keys.lock().contains(&Self::key(workload, worker_id))
    }
}

impl StateRepository for InMemoryStateRepository {
    fn register_worker(&self, _worker_id: &str) {}

    fn register_workload(&self, workload: &str, worker_id: &str) {
        let key = Self::key(workload, worker_id);
        let mut keys = self.keys.lock();
        if keys.contains(&key) {
            tracing::warn!(%key, "workload already registered");
        }
        keys.insert(key);
    }

    fn delete_workload(&self, workload: &str, worker_id: &str) {
        self.keys.lock().remove(&Self::key(workload, worker_id));
    }

    fn update_workload(&self, _workload: &str, _worker_id: &str) {}
}

#[cfg(test)]
#[path = "state_repository_tests.rs"]
mod tests;
