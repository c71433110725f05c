// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use fleet_core::CapabilityError;
use thiserror::Error;

/// Errors surfaced from the worker's native API.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("managed object does not exist")]
    WorkloadNotFound,

    #[error("managed object already exist")]
    WorkloadExists,

    #[error("worker is shutting down")]
    ShuttingDown,

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}
