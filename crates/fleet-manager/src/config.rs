// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manager configuration and its defaults.

use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_DISTRIBUTION_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_REBALANCE_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_CLEANUP_MAX_TIME: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_MAX_DELTA: u32 = 5;

/// Bounds the scheduler's total concurrent job slots; a tick that can't
/// acquire a slot is skipped and retried on its next interval.
pub const SCHEDULER_CONCURRENCY: usize = 10;

/// Tunables for the manager's identity and its three periodic jobs.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub manager_id: String,
    pub distribution_interval: Duration,
    pub rebalance_interval: Duration,
    pub cleanup_interval: Duration,
    pub cleanup_max_time: Duration,
    pub max_delta: u32,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            manager_id: Uuid::new_v4().to_string(),
            distribution_interval: DEFAULT_DISTRIBUTION_INTERVAL,
            rebalance_interval: DEFAULT_REBALANCE_INTERVAL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            cleanup_max_time: DEFAULT_CLEANUP_MAX_TIME,
            max_delta: DEFAULT_MAX_DELTA,
        }
    }
}

impl ManagerConfig {
    fleet_core::setters! {
        into { manager_id: String }
        set { distribution_interval: Duration, rebalance_interval: Duration, cleanup_interval: Duration, cleanup_max_time: Duration, max_delta: u32 }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
