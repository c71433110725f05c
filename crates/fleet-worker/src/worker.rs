// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker: holds a set of running [`Workload`] capability objects,
//! probes them on a jittered schedule, and reports their lifecycle out
//! through events and a [`StateRepository`].

use crate::config::{WorkerConfig, INIT_QUEUE_CAPACITY};
use crate::error::WorkerError;
use crate::state_repository::StateRepository;
use async_trait::async_trait;
use fleet_core::{CapabilityError, Clock, SystemClock, WorkerHandle, WorkloadId, Workload};
use fleet_wire::{Task, TaskResult, WorkerEvent, WorkerEventKind};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

struct WorkloadEntry {
    workload: Arc<dyn Workload>,
    probe: Option<JoinHandle<()>>,
}

/// Introspection snapshot of one workload's scheduled probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub workload: String,
    pub consecutive_failures: u32,
}

/// Holds a worker's live workloads and runs its background jobs: the
/// bounded init queue consumer, the per-workload jittered probe loop, the
/// fixed-interval garbage collector, and the event dispatch loop.
pub struct Worker<C: Clock = SystemClock> {
    id: String,
    splay_lo: Duration,
    splay_hi: Duration,
    ping_timeout: Duration,
    max_ping_down: u32,
    init_deadline: Duration,
    catalog: HashMap<String, Arc<dyn Workload>>,
    state: Arc<dyn StateRepository>,
    event_callbacks: Vec<Arc<dyn Fn(&WorkerEvent) + Send + Sync>>,
    err_callback: Option<Arc<dyn Fn(&WorkerError) + Send + Sync>>,
    clock: C,

    workloads: RwLock<HashMap<String, WorkloadEntry>>,
    fail_counter: Mutex<HashMap<String, u32>>,

    init_tx: mpsc::Sender<Arc<dyn Workload>>,
    event_tx: mpsc::UnboundedSender<WorkerEvent>,
    token: CancellationToken,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl Worker<SystemClock> {
    pub fn new(config: WorkerConfig) -> Arc<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock + 'static> Worker<C> {
    pub fn with_clock(config: WorkerConfig, clock: C) -> Arc<Self> {
        let (init_tx, init_rx) = mpsc::channel(INIT_QUEUE_CAPACITY);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let catalog = config
            .catalog
            .iter()
            .map(|w| (w.name().to_string(), w.clone()))
            .collect();

        let worker = Arc::new(Self {
            id: config.worker_id,
            splay_lo: config.splay_lo,
            splay_hi: config.splay_hi,
            ping_timeout: config.ping_timeout,
            max_ping_down: config.max_ping_down,
            init_deadline: config.init_deadline,
            catalog,
            state: config.state,
            event_callbacks: config.event_callbacks,
            err_callback: config.err_callback,
            clock,
            workloads: RwLock::new(HashMap::new()),
            fail_counter: Mutex::new(HashMap::new()),
            init_tx,
            event_tx,
            token: CancellationToken::new(),
            background: Mutex::new(Vec::new()),
        });

        worker.state.register_worker(&worker.id);

        let h1 = tokio::spawn(worker.clone().run_init_loop(init_rx));
        let h2 = tokio::spawn(worker.clone().run_event_loop(event_rx));
        let h3 = tokio::spawn(worker.clone().run_gc_loop());
        *worker.background.lock() = vec![h1, h2, h3];

        worker
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Every workload name currently tracked (initializing or running).
    pub fn workloads(&self) -> Vec<String> {
        self.workloads.read().keys().cloned().collect()
    }

    /// Introspection over each tracked workload's probe failure count.
    pub fn tasks(&self) -> Vec<ScheduledTask> {
        let counters = self.fail_counter.lock();
        self.workloads
            .read()
            .keys()
            .map(|name| ScheduledTask {
                workload: name.clone(),
                consecutive_failures: counters.get(name).copied().unwrap_or(0),
            })
            .collect()
    }

    /// Register and start initializing a workload supplied directly by the caller.
    pub async fn add_workload(&self, workload: Arc<dyn Workload>) -> Result<(), WorkerError> {
        self.enqueue(workload).await
    }

    pub async fn delete_workload(&self, name: &str) -> Result<(), WorkerError> {
        self.teardown(name, true).await
    }

    pub async fn run_task(&self, target: &str, task: &Task) -> Result<TaskResult, WorkerError> {
        let start_instant = self.clock.now();
        let start_epoch = self.clock.epoch_ms();

        let workload = {
            let workloads = self.workloads.read();
            workloads.get(target).map(|e| e.workload.clone())
        }
        .ok_or(WorkerError::WorkloadNotFound)?;

        let outcome = workload.run_task(&task.command, &task.args, &task.kwargs).await;
        let execution_time = self.clock.now().duration_since(start_instant).as_millis() as u64;

        let (success, error, return_value) = match outcome {
            Ok(value) => (true, None, value),
            Err(e) => (false, Some(e.to_string()), serde_json::Value::Null),
        };

        Ok(TaskResult {
            job_id: uuid::Uuid::new_v4().to_string(),
            worker_id: self.id.clone(),
            tags: Vec::new(),
            hostname: target.to_string(),
            command: task.command.clone(),
            args: task.args.clone(),
            kwargs: task.kwargs.clone(),
            success,
            error,
            return_value,
            timestamp: start_epoch,
            execution_time,
        })
    }

    /// Cancel every background job, stop every tracked workload, and wait
    /// for the background tasks to finish.
    pub async fn stop(&self) {
        self.token.cancel();

        let names: Vec<String> = self.workloads.read().keys().cloned().collect();
        for name in names {
            let _ = self.teardown(&name, false).await;
        }

        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.background.lock());
        for handle in handles {
            let _ = handle.await;
        }
    }

    // ---- Internals ------------------------------------------------------

    fn emit(&self, event: WorkerEvent) {
        let _ = self.event_tx.send(event);
    }

    async fn enqueue(&self, workload: Arc<dyn Workload>) -> Result<(), WorkerError> {
        let name = workload.name().to_string();
        {
            let mut workloads = self.workloads.write();
            if workloads.contains_key(&name) {
                return Err(WorkerError::WorkloadExists);
            }
            workloads.insert(
                name.clone(),
                WorkloadEntry {
                    workload: workload.clone(),
                    probe: None,
                },
            );
        }

        self.state.register_workload(&name, &self.id);
        self.emit(WorkerEvent::new(WorkerEventKind::WorkloadAdded, &self.id, &name));

        self.init_tx.send(workload).await.map_err(|_| WorkerError::ShuttingDown)
    }

    /// Remove a tracked workload, abort its probe, and call `stop` on it.
    async fn teardown(&self, name: &str, emit: bool) -> Result<(), WorkerError> {
        let entry = self.workloads.write().remove(name);

        let Some(entry) = entry else {
            return Err(WorkerError::WorkloadNotFound);
        };

        if let Some(probe) = entry.probe {
            probe.abort();
        }

        let result = entry.workload.stop().await;
        self.fail_counter.lock().remove(name);

        if emit {
            self.emit(WorkerEvent::new(WorkerEventKind::WorkloadDead, &self.id, name));
        }

        Ok(result?)
    }

    fn state_update(&self, event: &WorkerEvent) {
        match event.event_type {
            WorkerEventKind::WorkloadInitialized => self.state.register_workload(&event.managed_object, &self.id),
            WorkerEventKind::WorkloadDead => self.state.delete_workload(&event.managed_object, &self.id),
            WorkerEventKind::WorkloadReachable => self.state.update_workload(&event.managed_object, &self.id),
            _ => {}
        }
    }

    async fn run_event_loop(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<WorkerEvent>) {
        loop {
            tokio::select! {
                _ = self.token.cancelled() => return,
                event = rx.recv() => {
                    let Some(event) = event else { return };
                    self.state_update(&event);
                    for cb in self.event_callbacks.clone() {
                        let event = event.clone();
                        tokio::spawn(async move { cb(&event) });
                    }
                }
            }
        }
    }

    async fn run_init_loop(self: Arc<Self>, mut rx: mpsc::Receiver<Arc<dyn Workload>>) {
        loop {
            tokio::select! {
                _ = self.token.cancelled() => return,
                next = rx.recv() => {
                    let Some(workload) = next else { return };
                    self.clone().init_one(workload).await;
                }
            }
        }
    }

    async fn init_one(self: Arc<Self>, workload: Arc<dyn Workload>) {
        let name = workload.name().to_string();

        match timeout(self.init_deadline, workload.init()).await {
            Ok(Ok(())) => {
                let probe = tokio::spawn(self.clone().run_probe_loop(name.clone(), workload.clone()));
                if let Some(entry) = self.workloads.write().get_mut(&name) {
                    entry.probe = Some(probe);
                }
                self.emit(WorkerEvent::new(WorkerEventKind::WorkloadInitialized, &self.id, &name));
            }
            Ok(Err(err)) => self.teardown_failed_init(&name, workload, err).await,
            Err(_) => {
                self.teardown_failed_init(&name, workload, CapabilityError::new("init deadline exceeded"))
                    .await
            }
        }
    }

    async fn teardown_failed_init(&self, name: &str, workload: Arc<dyn Workload>, err: CapabilityError) {
        self.workloads.write().remove(name);
        self.fail_counter.lock().remove(name);

        if let Err(stop_err) = workload.stop().await {
            self.emit(WorkerEvent::new(WorkerEventKind::WorkloadInitError, &self.id, name));
            if let Some(cb) = &self.err_callback {
                cb(&WorkerError::Capability(stop_err));
            }
        }

        self.state.delete_workload(name, &self.id);
        self.emit(WorkerEvent::new(WorkerEventKind::WorkloadDeleted, &self.id, name));

        if let Some(cb) = &self.err_callback {
            cb(&WorkerError::Capability(err));
        }
    }

    async fn run_probe_loop(self: Arc<Self>, name: String, workload: Arc<dyn Workload>) {
        loop {
            let splay = {
                let lo_ms = self.splay_lo.as_millis().max(1) as u64;
                let hi_ms = self.splay_hi.as_millis().max(lo_ms) as u64;
                Duration::from_millis(rand::thread_rng().gen_range(lo_ms..=hi_ms))
            };

            tokio::select! {
                _ = self.token.cancelled() => return,
                _ = tokio::time::sleep(splay) => {}
            }

            if !self.workloads.read().contains_key(&name) {
                return;
            }

            self.probe_once(&name, &workload).await;
        }
    }

    /// Pings outside the fail-counter lock: only the counter update itself
    /// is a critical section, never the network call.
    async fn probe_once(&self, name: &str, workload: &Arc<dyn Workload>) {
        let result = timeout(self.ping_timeout, workload.ping()).await;

        match result {
            Ok(Ok(())) => {
                self.fail_counter.lock().remove(name);
                self.emit(WorkerEvent::new(WorkerEventKind::WorkloadReachable, &self.id, name));
            }
            _ => {
                *self.fail_counter.lock().entry(name.to_string()).or_insert(0) += 1;
                self.emit(WorkerEvent::new(WorkerEventKind::WorkloadUnreachable, &self.id, name));
            }
        }
    }

    async fn run_gc_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(Duration::from_secs(10));
        loop {
            tokio::select! {
                _ = self.token.cancelled() => return,
                _ = interval.tick() => {}
            }

            let evicted: Vec<String> = {
                let mut counters = self.fail_counter.lock();
                let hosts: Vec<String> = counters
                    .iter()
                    .filter(|(_, &count)| count >= self.max_ping_down)
                    .map(|(host, _)| host.clone())
                    .collect();
                for host in &hosts {
                    counters.remove(host);
                }
                hosts
            };

            for host in evicted {
                if let Err(err) = self.teardown(&host, true).await {
                    if let Some(cb) = &self.err_callback {
                        cb(&err);
                    }
                }
            }
        }
    }
}

#[async_trait]
impl<C: Clock + 'static> WorkerHandle for Worker<C> {
    fn id(&self) -> &str {
        &self.id
    }

    async fn load(&self, workload: &WorkloadId) -> Result<(), CapabilityError> {
        let object = self
            .catalog
            .get(workload.as_str())
            .cloned()
            .ok_or_else(|| CapabilityError::new(format!("no catalog entry for workload {workload}")))?;

        self.enqueue(object).await.map_err(|e| CapabilityError::new(e.to_string()))
    }

    async fn unload(&self, workload: &WorkloadId) -> Result<(), CapabilityError> {
        self.teardown(workload.as_str(), true)
            .await
            .map_err(|e| CapabilityError::new(e.to_string()))
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
