// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker configuration and its defaults.

use crate::error::WorkerError;
use crate::state_repository::{InMemoryStateRepository, StateRepository};
use fleet_core::Workload;
use fleet_wire::WorkerEvent;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_SPLAY_LO: Duration = Duration::from_secs(8);
pub const DEFAULT_SPLAY_HI: Duration = Duration::from_secs(10);
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_PINGDOWN: u32 = 2;
pub const DEFAULT_INIT_DEADLINE: Duration = Duration::from_secs(25);

/// Bound on the init queue; a `Load`/`add_workload` call past this capacity
/// blocks until a slot frees up rather than spawning unbounded work.
pub const INIT_QUEUE_CAPACITY: usize = 192;

/// Tunables for a worker's identity, probe cadence, and failure handling.
pub struct WorkerConfig {
    pub worker_id: String,
    pub splay_lo: Duration,
    pub splay_hi: Duration,
    pub ping_timeout: Duration,
    pub max_ping_down: u32,
    pub init_deadline: Duration,
    pub(crate) catalog: Vec<Arc<dyn Workload>>,
    pub(crate) state: Arc<dyn StateRepository>,
    pub(crate) event_callbacks: Vec<Arc<dyn Fn(&WorkerEvent) + Send + Sync>>,
    pub(crate) err_callback: Option<Arc<dyn Fn(&WorkerError) + Send + Sync>>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker_id: Uuid::new_v4().to_string(),
            splay_lo: DEFAULT_SPLAY_LO,
            splay_hi: DEFAULT_SPLAY_HI,
            ping_timeout: DEFAULT_PING_TIMEOUT,
            max_ping_down: DEFAULT_MAX_PINGDOWN,
            init_deadline: DEFAULT_INIT_DEADLINE,
            catalog: Vec::new(),
            state: Arc::new(InMemoryStateRepository::new()),
            event_callbacks: Vec::new(),
            err_callback: None,
        }
    }
}

impl WorkerConfig {
    fleet_core::setters! {
        into { worker_id: String }
        set { splay_lo: Duration, splay_hi: Duration, ping_timeout: Duration, max_ping_down: u32, init_deadline: Duration }
    }

    /// Register a workload capability the worker may later `Load` by name.
    pub fn with_workload(mut self, workload: Arc<dyn Workload>) -> Self {
        self.catalog.push(workload);
        self
    }

    pub fn with_state_repository(mut self, repo: Arc<dyn StateRepository>) -> Self {
        self.state = repo;
        self
    }

    pub fn with_event_callback(mut self, cb: impl Fn(&WorkerEvent) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Arc::new(cb));
        self
    }

    pub fn with_error_callback(mut self, cb: impl Fn(&WorkerError) + Send + Sync + 'static) -> Self {
        self.err_callback = Some(Arc::new(cb));
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
