// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker side of the control plane: a set of running [`fleet_core::Workload`]
//! capability objects, probed on a jittered schedule and reported out through
//! events and a pluggable [`StateRepository`].

mod config;
mod error;
mod state_repository;
mod worker;

pub use config::{
    WorkerConfig, DEFAULT_INIT_DEADLINE, DEFAULT_MAX_PINGDOWN, DEFAULT_PING_TIMEOUT, DEFAULT_SPLAY_HI,
    DEFAULT_SPLAY_LO, INIT_QUEUE_CAPACITY,
};
pub use error::WorkerError;
pub use state_repository::{InMemoryStateRepository, StateRepository};
pub use worker::{ScheduledTask, Worker};
