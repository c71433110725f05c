// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task dispatch and result envelopes exchanged between a caller and a worker.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A command to run against a named workload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub kwargs: HashMap<String, serde_json::Value>,
}

impl Task {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            kwargs: HashMap::new(),
        }
    }
}

/// The outcome of running a [`Task`], stamped with timing metadata by the worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub job_id: String,
    pub worker_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub hostname: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub kwargs: HashMap<String, serde_json::Value>,
    pub success: bool,
    pub error: Option<String>,
    #[serde(rename = "return")]
    pub return_value: serde_json::Value,
    /// Epoch milliseconds at which execution started.
    pub timestamp: u64,
    /// Wall-clock duration of the task in milliseconds.
    pub execution_time: u64,
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
