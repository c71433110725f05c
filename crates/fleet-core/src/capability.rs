// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capability-set abstractions for the two sides of the control plane.
//!
//! The manager never holds a concrete worker type, only a [`WorkerHandle`];
//! the worker never holds a concrete workload type, only a [`Workload`].
//! Both are modeled as object-safe async traits rather than a shared base
//! type, so the manager and worker crates stay free of a cyclic dependency.

use crate::WorkloadId;
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Raised by a capability call that crosses the network to a worker or workload.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CapabilityError(pub String);

impl CapabilityError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// The manager's view of a worker: load and unload a workload by id.
///
/// Opaque beyond this capability set — the manager identifies a worker only
/// by its [`crate::WorkerId`] and never reaches into its internals.
#[async_trait]
pub trait WorkerHandle: Send + Sync {
    fn id(&self) -> &str;

    async fn load(&self, workload: &WorkloadId) -> Result<(), CapabilityError>;

    async fn unload(&self, workload: &WorkloadId) -> Result<(), CapabilityError>;
}

/// The worker's view of a workload: the `{init, ping, runTask, stop, name, info}`
/// capability set it dispatches against.
#[async_trait]
pub trait Workload: Send + Sync {
    fn name(&self) -> &str;

    async fn init(&self) -> Result<(), CapabilityError>;

    async fn ping(&self) -> Result<(), CapabilityError>;

    async fn stop(&self) -> Result<(), CapabilityError>;

    async fn run_task(
        &self,
        command: &str,
        args: &[String],
        kwargs: &HashMap<String, serde_json::Value>,
    ) -> Result<serde_json::Value, CapabilityError>;

    fn info(&self) -> HashMap<String, serde_json::Value> {
        HashMap::new()
    }
}

#[cfg(test)]
#[path = "capability_tests.rs"]
mod tests;
