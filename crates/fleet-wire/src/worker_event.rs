// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event envelope published by a worker.

use crate::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The worker's lifecycle event tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerEventKind {
    WorkloadInitialized,
    WorkloadUnreachable,
    WorkloadReachable,
    WorkloadDead,
    WorkloadAdded,
    WorkloadDeleted,
    WorkloadInitError,
}

fleet_core::simple_display! {
    WorkerEventKind {
        WorkloadInitialized => "workload.initialized",
        WorkloadUnreachable => "workload.unreachable",
        WorkloadReachable => "workload.reachable",
        WorkloadDead => "workload.dead",
        WorkloadAdded => "workload.added",
        WorkloadDeleted => "workload.deleted",
        WorkloadInitError => "workload.init.error",
    }
}

impl FromStr for WorkerEventKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workload.initialized" => Ok(Self::WorkloadInitialized),
            "workload.unreachable" => Ok(Self::WorkloadUnreachable),
            "workload.reachable" => Ok(Self::WorkloadReachable),
            "workload.dead" => Ok(Self::WorkloadDead),
            "workload.added" => Ok(Self::WorkloadAdded),
            "workload.deleted" => Ok(Self::WorkloadDeleted),
            "workload.init.error" => Ok(Self::WorkloadInitError),
            _ => Err(ProtocolError::InvalidEvent),
        }
    }
}

impl Serialize for WorkerEventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for WorkerEventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| serde::de::Error::custom("invalid event type"))
    }
}

/// Wire envelope published for every worker lifecycle event.
///
/// `manager` carries the worker's own id (named for the field the original
/// event shape used); `managed_object` is the workload's name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkerEvent {
    pub event_type: WorkerEventKind,
    pub manager: String,
    pub managed_object: String,
    pub message: String,
}

impl WorkerEvent {
    pub fn new(kind: WorkerEventKind, worker_id: impl Into<String>, workload: impl Into<String>) -> Self {
        let message = match kind {
            WorkerEventKind::WorkloadInitialized => "workload initiated",
            WorkerEventKind::WorkloadUnreachable => "workload unreachable",
            WorkerEventKind::WorkloadReachable => "workload reachable",
            WorkerEventKind::WorkloadDead => "workload unresponsive",
            WorkerEventKind::WorkloadAdded => "workload added",
            WorkerEventKind::WorkloadDeleted => "workload deleted",
            WorkerEventKind::WorkloadInitError => "workload initialization failed",
        };

        Self {
            event_type: kind,
            manager: worker_id.into(),
            managed_object: workload.into(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for WorkerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.event_type, self.managed_object)
    }
}

#[cfg(test)]
#[path = "worker_event_tests.rs"]
mod tests;
