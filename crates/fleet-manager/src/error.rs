// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use fleet_core::CapabilityError;
use fleet_store::StoreError;
use thiserror::Error;

/// Errors surfaced from the manager's public API.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("worker already exists")]
    WorkerExists,

    #[error("no such worker")]
    WorkerNotFound,

    #[error("workload already exists")]
    WorkloadExists,

    #[error("no such workload")]
    WorkloadNotFound,

    #[error("missing association")]
    AssociationNotFound,

    #[error("scheduler construction failed: {0}")]
    SchedulerInit(String),

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

impl From<StoreError> for ManagerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::WorkerExists => Self::WorkerExists,
            StoreError::WorkerNotFound => Self::WorkerNotFound,
            StoreError::WorkloadExists => Self::WorkloadExists,
            StoreError::WorkloadNotFound => Self::WorkloadNotFound,
            StoreError::AssociationNotFound => Self::AssociationNotFound,
        }
    }
}
