// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced from state store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no such worker")]
    WorkerNotFound,

    #[error("no such workload")]
    WorkloadNotFound,

    #[error("worker already exists")]
    WorkerExists,

    #[error("workload already exists")]
    WorkloadExists,

    #[error("no association for workload")]
    AssociationNotFound,
}
