// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Re-export of the wire-level `Status` encoding, exercised here against
//! the exact scenarios called out in the external interface contract.

pub use fleet_core::{Status, StatusParseError};

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "status_property_tests.rs"]
mod property_tests;
