// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The manager: owns the workload→worker mapping and the three periodic
//! jobs (distribute, rebalance, cleanup) that keep it converged.

use crate::{config::SCHEDULER_CONCURRENCY, scheduler::Scheduler, ManagerConfig, ManagerError, Signal, TracingSignal};
use fleet_core::{CapabilityError, Clock, Status, SystemClock, WorkerHandle, WorkerId, WorkloadId, WorkloadRecord};
use fleet_store::InMemoryStore;
use fleet_wire::ManagerEvent;
use futures_util::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Owns the authoritative workload→worker mapping and runs the three
/// scheduled jobs under the store's coarse lock.
pub struct Manager<C: Clock = SystemClock> {
    config: ManagerConfig,
    store: Arc<InMemoryStore>,
    signal: Arc<dyn Signal>,
    clock: C,
    token: CancellationToken,
    scheduler: Scheduler,
}

impl Manager<SystemClock> {
    /// Build a manager with the default system clock and a stdout/tracing signal sink.
    pub fn new(config: ManagerConfig) -> Arc<Self> {
        Self::with_collaborators(config, Arc::new(InMemoryStore::new()), Arc::new(TracingSignal), SystemClock)
    }
}

impl<C: Clock + 'static> Manager<C> {
    pub fn with_collaborators(
        config: ManagerConfig,
        store: Arc<InMemoryStore>,
        signal: Arc<dyn Signal>,
        clock: C,
    ) -> Arc<Self> {
        let token = CancellationToken::new();
        Arc::new(Self {
            scheduler: Scheduler::new(SCHEDULER_CONCURRENCY, token.clone()),
            config,
            store,
            signal,
            clock,
            token,
        })
    }

    /// Start the three periodic jobs. Each reschedules from the completion
    /// of its previous run; all three are mutually exclusive via the
    /// store's lock.
    pub fn run(self: Arc<Self>) {
        let m = self.clone();
        self.scheduler
            .spawn_periodic("distributor", self.config.distribution_interval, move || {
                let m = m.clone();
                async move { m.distributor().await }
            });

        let m = self.clone();
        self.scheduler
            .spawn_periodic("rebalance", self.config.rebalance_interval, move || {
                let m = m.clone();
                async move { m.rebalance().await }
            });

        let m = self.clone();
        self.scheduler
            .spawn_periodic("cleanup", self.config.cleanup_interval, move || {
                let m = m.clone();
                async move { m.cleanup().await }
            });
    }

    /// Cancel the manager's context; all spawned job tasks unblock promptly.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    // ---- External mutator / read-through API -------------------------------

    pub async fn add_worker(&self, worker: Arc<dyn WorkerHandle>) -> Result<(), ManagerError> {
        let id = WorkerId::new(worker.id());
        let mut store = self.store.lock().await;
        store.try_add_worker(id.clone(), worker)?;
        drop(store);
        self.signal.event(&ManagerEvent::worker_added(&self.config.manager_id, id.as_str()));
        Ok(())
    }

    /// Resets every workload formerly owned by `id` to `Init` and forgets the
    /// worker. No `Unload` is sent — the worker is assumed gone.
    pub async fn delete_worker(&self, id: &WorkerId) {
        let mut store = self.store.lock().await;
        for wl_id in store.get_associations(id) {
            store.disassociate(&wl_id);
            if let Some(mut rec) = store.get_workload(&wl_id) {
                rec.set_status(Status::Init, &self.clock);
                store.update_workload(rec);
            }
        }
        store.delete_worker(id);
        drop(store);
        self.signal.event(&ManagerEvent::worker_deleted(&self.config.manager_id, id.as_str()));
    }

    pub async fn add_workload(&self, id: impl Into<WorkloadId>) -> Result<(), ManagerError> {
        let id = id.into();
        let mut store = self.store.lock().await;
        store.try_add_workload(WorkloadRecord::new(id.clone(), &self.clock))?;
        drop(store);
        self.signal.event(&ManagerEvent::workload_added(&self.config.manager_id, id.as_str()));
        Ok(())
    }

    pub async fn delete_workload(&self, id: &WorkloadId) {
        let mut store = self.store.lock().await;
        store.disassociate(id);
        store.delete_workload(id);
        drop(store);
        self.signal.event(&ManagerEvent::workload_deleted(&self.config.manager_id, id.as_str()));
    }

    /// Bypass operation: reconciles a manager started against a pre-populated
    /// worker. Sets the workload `Running` and records the association
    /// without calling `Load`.
    pub async fn assign(&self, w: &WorkerId, wl: &WorkloadId) -> Result<(), ManagerError> {
        let mut store = self.store.lock().await;
        store.require_worker(w)?;
        let mut rec = store.require_workload(wl)?;
        rec.set_status(Status::Running, &self.clock);
        store.update_workload(rec);
        store.associate(wl, w);
        Ok(())
    }

    pub async fn workers(&self) -> Vec<Arc<dyn WorkerHandle>> {
        self.store.lock().await.get_all_workers()
    }

    pub async fn workloads(&self) -> Vec<WorkloadRecord> {
        self.store.lock().await.get_all_workloads()
    }

    pub async fn get_worker(&self, id: &WorkerId) -> Option<Arc<dyn WorkerHandle>> {
        self.store.lock().await.get_worker(id)
    }

    pub async fn get_workload(&self, id: &WorkloadId) -> Option<WorkloadRecord> {
        self.store.lock().await.get_workload(id)
    }

    pub async fn get_association(&self, wl: &WorkloadId) -> Option<WorkerId> {
        self.store.lock().await.get_association(wl)
    }

    pub async fn get_associations(&self, w: &WorkerId) -> Vec<WorkloadId> {
        self.store.lock().await.get_associations(w)
    }

    // ---- Scheduled jobs ------------------------------------------------

    /// Place every workload currently unassociated onto the least-loaded
    /// worker. Holds the store lock for the entire pass.
    pub async fn distributor(&self) {
        let mut store = self.store.lock().await;

        let workers = store.get_all_workers();
        let wanted: HashSet<WorkloadId> = store.get_all_workloads().into_iter().map(|r| r.id).collect();

        let mut current: HashMap<String, (Arc<dyn WorkerHandle>, Vec<WorkloadId>)> = HashMap::new();
        for w in &workers {
            let wid = w.id().to_string();
            let held = store.get_associations(&WorkerId::new(wid.clone()));
            current.insert(wid, (w.clone(), held));
        }

        // Step 2: unload anything held but no longer wanted, in parallel.
        let mut unload_targets: Vec<(Arc<dyn WorkerHandle>, WorkloadId)> = Vec::new();
        for (w, held) in current.values() {
            for wl_id in held {
                if !wanted.contains(wl_id) {
                    unload_targets.push((w.clone(), wl_id.clone()));
                }
            }
        }

        let unload_results = join_all(unload_targets.into_iter().map(|(w, wl_id)| async move {
            let result = w.unload(&wl_id).await;
            (wl_id, result)
        }))
        .await;

        for (wl_id, result) in &unload_results {
            if let Err(e) = result {
                tracing::warn!(workload = %wl_id, "unload of orphaned workload failed, disassociating anyway");
                self.signal.error(&ManagerError::Capability(CapabilityError::new(e.to_string())));
            }
            store.disassociate(wl_id);
            for (_, held) in current.values_mut() {
                held.retain(|id| id != wl_id);
            }
        }

        // Step 3: greedy placement of every still-unassociated wanted workload.
        let mut load: HashMap<String, usize> =
            current.iter().map(|(id, (_, held))| (id.clone(), held.len())).collect();
        let associated: HashSet<WorkloadId> =
            current.values().flat_map(|(_, held)| held.iter().cloned()).collect();
        let distribute: Vec<WorkloadId> = wanted.into_iter().filter(|id| !associated.contains(id)).collect();

        let mut picks: Vec<(Arc<dyn WorkerHandle>, WorkloadId)> = Vec::new();
        for wl_id in distribute {
            let pick = current
                .iter()
                .min_by(|a, b| load[a.0].cmp(&load[b.0]).then(a.0.cmp(b.0)))
                .map(|(id, (w, _))| (id.clone(), w.clone()));

            let (wid, w) = match pick {
                Some(picked) => picked,
                None => break,
            };
            *load.get_mut(&wid).expect("worker present in load map") += 1;

            if let Some(mut rec) = store.get_workload(&wl_id) {
                rec.set_status(Status::Distributing, &self.clock);
                store.update_workload(rec);
            }
            picks.push((w, wl_id));
        }

        // Step 4: issue Load calls in parallel; react to each outcome.
        let load_results = join_all(picks.into_iter().map(|(w, wl_id)| async move {
            let result = w.load(&wl_id).await;
            (w, wl_id, result)
        }))
        .await;

        for (w, wl_id, result) in load_results {
            match result {
                Ok(()) => {
                    if let Some(mut rec) = store.get_workload(&wl_id) {
                        rec.set_status(Status::Running, &self.clock);
                        store.update_workload(rec);
                    }
                    store.associate(&wl_id, &WorkerId::new(w.id()));
                    self.signal.event(&ManagerEvent::workload_distributed(
                        &self.config.manager_id,
                        wl_id.as_str(),
                        w.id(),
                    ));
                }
                Err(_) => {
                    if let Some(mut rec) = store.get_workload(&wl_id) {
                        rec.set_status(Status::Init, &self.clock);
                        store.update_workload(rec);
                    }
                    self.signal.event(&ManagerEvent::workload_distributed_error(
                        &self.config.manager_id,
                        wl_id.as_str(),
                        w.id(),
                    ));
                }
            }
        }
    }

    /// Evict workloads from the most-loaded worker until the imbalance is
    /// within `maxDelta`. Holds the store lock for the entire pass.
    pub async fn rebalance(&self) {
        let mut store = self.store.lock().await;

        loop {
            if self.token.is_cancelled() {
                break;
            }

            let workers = store.get_all_workers();
            if workers.is_empty() {
                break;
            }

            let mut by_worker: HashMap<String, (Arc<dyn WorkerHandle>, Vec<WorkloadId>)> = HashMap::new();
            for w in &workers {
                let wid = w.id().to_string();
                let held = store.get_associations(&WorkerId::new(wid.clone()));
                by_worker.insert(wid, (w.clone(), held));
            }

            let (hi_id, hi_count) = by_worker
                .iter()
                .map(|(id, (_, held))| (id.clone(), held.len()))
                .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
                .expect("workers non-empty");
            let (_, lo_count) = by_worker
                .iter()
                .map(|(id, (_, held))| (id.clone(), held.len()))
                .min_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
                .expect("workers non-empty");

            let delta = hi_count as i64 - lo_count as i64;
            if delta <= self.config.max_delta as i64 {
                break;
            }

            let (hi_worker, hi_workloads) = by_worker.get(&hi_id).cloned().expect("hi worker present");

            let mut records: Vec<WorkloadRecord> =
                hi_workloads.iter().filter_map(|id| store.get_workload(id)).collect();
            records.sort_by_key(|r| r.last_status_change);

            let take_n = ((delta - self.config.max_delta as i64) + 1).max(0) as usize;
            let take_n = take_n.min(records.len());
            let victims: Vec<WorkloadId> = records.into_iter().take(take_n).map(|r| r.id).collect();

            if victims.is_empty() {
                break;
            }

            let mut reduced = false;
            for wl_id in &victims {
                match hi_worker.unload(wl_id).await {
                    Ok(()) => {
                        store.disassociate(wl_id);
                        if let Some(mut rec) = store.get_workload(wl_id) {
                            rec.set_status(Status::Init, &self.clock);
                            store.update_workload(rec);
                        }
                        reduced = true;
                    }
                    Err(e) => {
                        tracing::warn!(worker = %hi_id, workload = %wl_id, "unload during rebalance failed, retrying next pass");
                        self.signal.error(&ManagerError::Capability(CapabilityError::new(e.to_string())));
                    }
                }
            }

            if !reduced {
                break;
            }
        }
    }

    /// Unstick workloads left in a transient status longer than `cleanupMaxTime`.
    pub async fn cleanup(&self) {
        let mut store = self.store.lock().await;
        let now = self.clock.now();

        for rec in store.get_all_workloads() {
            let age = now.duration_since(rec.last_status_change);
            match rec.status {
                Status::Distributing if age >= self.config.cleanup_max_time => {
                    let mut updated = rec.clone();
                    updated.set_status(Status::Err, &self.clock);
                    store.update_workload(updated);
                    store.disassociate(&rec.id);
                }
                Status::Err if age >= self.config.cleanup_max_time => {
                    let mut updated = rec.clone();
                    updated.set_status(Status::Init, &self.clock);
                    store.update_workload(updated);
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
