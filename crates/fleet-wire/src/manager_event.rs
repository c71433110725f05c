// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event envelope published by the manager.

use crate::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The manager's lifecycle event tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagerEventKind {
    WorkerAdded,
    WorkerDeleted,
    WorkloadAdded,
    WorkloadDeleted,
    WorkloadDistributed,
    WorkloadDistributedError,
}

fleet_core::simple_display! {
    ManagerEventKind {
        WorkerAdded => "worker.added",
        WorkerDeleted => "worker.deleted",
        WorkloadAdded => "workload.added",
        WorkloadDeleted => "workload.deleted",
        WorkloadDistributed => "workload.distributed",
        WorkloadDistributedError => "workload.distributed.error",
    }
}

impl FromStr for ManagerEventKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "worker.added" => Ok(Self::WorkerAdded),
            "worker.deleted" => Ok(Self::WorkerDeleted),
            "workload.added" => Ok(Self::WorkloadAdded),
            "workload.deleted" => Ok(Self::WorkloadDeleted),
            "workload.distributed" => Ok(Self::WorkloadDistributed),
            "workload.distributed.error" => Ok(Self::WorkloadDistributedError),
            _ => Err(ProtocolError::InvalidEvent),
        }
    }
}

impl Serialize for ManagerEventKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ManagerEventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| serde::de::Error::custom("invalid event type"))
    }
}

/// Wire envelope published for every manager lifecycle event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManagerEvent {
    #[serde(rename = "type")]
    pub kind: ManagerEventKind,
    pub manager_id: String,
    pub resource_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub worker_id: Option<String>,
}

impl ManagerEvent {
    pub fn worker_added(manager_id: impl Into<String>, worker_id: impl Into<String>) -> Self {
        Self {
            kind: ManagerEventKind::WorkerAdded,
            manager_id: manager_id.into(),
            resource_id: worker_id.into(),
            worker_id: None,
        }
    }

    pub fn worker_deleted(manager_id: impl Into<String>, worker_id: impl Into<String>) -> Self {
        Self {
            kind: ManagerEventKind::WorkerDeleted,
            manager_id: manager_id.into(),
            resource_id: worker_id.into(),
            worker_id: None,
        }
    }

    pub fn workload_added(manager_id: impl Into<String>, workload_id: impl Into<String>) -> Self {
        Self {
            kind: ManagerEventKind::WorkloadAdded,
            manager_id: manager_id.into(),
            resource_id: workload_id.into(),
            worker_id: None,
        }
    }

    pub fn workload_deleted(manager_id: impl Into<String>, workload_id: impl Into<String>) -> Self {
        Self {
            kind: ManagerEventKind::WorkloadDeleted,
            manager_id: manager_id.into(),
            resource_id: workload_id.into(),
            worker_id: None,
        }
    }

    pub fn workload_distributed(
        manager_id: impl Into<String>,
        workload_id: impl Into<String>,
        worker_id: impl Into<String>,
    ) -> Self {
        Self {
            kind: ManagerEventKind::WorkloadDistributed,
            manager_id: manager_id.into(),
            resource_id: workload_id.into(),
            worker_id: Some(worker_id.into()),
        }
    }

    pub fn workload_distributed_error(
        manager_id: impl Into<String>,
        workload_id: impl Into<String>,
        worker_id: impl Into<String>,
    ) -> Self {
        Self {
            kind: ManagerEventKind::WorkloadDistributedError,
            manager_id: manager_id.into(),
            resource_id: workload_id.into(),
            worker_id: Some(worker_id.into()),
        }
    }
}

impl fmt::Display for ManagerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.resource_id)
    }
}

#[cfg(test)]
#[path = "manager_event_tests.rs"]
mod tests;
