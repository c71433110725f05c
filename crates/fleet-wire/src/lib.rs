// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-wire envelopes for manager/worker events and task dispatch.
//!
//! Wire format: JSON payloads with the field shapes fixed in the external
//! interface contract. Encoding and decoding are exposed as plain
//! `serde_json` round trips through [`encode`] and [`decode`]; there is no
//! framing layer because the reference transport is left to callers.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod error;
mod manager_event;
mod status;
mod task;
mod worker_event;

pub use error::ProtocolError;
pub use manager_event::{ManagerEvent, ManagerEventKind};
pub use status::{Status, StatusParseError};
pub use task::{Task, TaskResult};
pub use worker_event::{WorkerEvent, WorkerEventKind};

/// Serialize a wire type to its canonical JSON form.
pub fn encode<T: serde::Serialize>(value: &T) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(value)?)
}

/// Parse a wire type from its canonical JSON form.
pub fn decode<T: serde::de::DeserializeOwned>(payload: &str) -> Result<T, ProtocolError> {
    Ok(serde_json::from_str(payload)?)
}
