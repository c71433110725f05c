// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The manager's event/error sink.

use crate::ManagerError;
use fleet_wire::ManagerEvent;

/// Receives every lifecycle event and every internal error the manager
/// produces. Implementations must not block for long — the manager calls
/// this synchronously from inside job bodies that hold the store lock.
pub trait Signal: Send + Sync {
    fn event(&self, event: &ManagerEvent);
    fn error(&self, err: &ManagerError);
}

/// Default sink: logs events and errors through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSignal;

impl Signal for TracingSignal {
    fn event(&self, event: &ManagerEvent) {
        tracing::info!(
            event_type = %event.kind,
            manager_id = %event.manager_id,
            resource_id = %event.resource_id,
            worker_id = event.worker_id.as_deref().unwrap_or(""),
            "received event"
        );
    }

    fn error(&self, err: &ManagerError) {
        tracing::warn!(error = %err, "received error");
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
