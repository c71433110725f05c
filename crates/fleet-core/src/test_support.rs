// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

/// Proptest strategies for core data-model types.
pub mod strategies {
    use crate::Status;
    use proptest::prelude::*;

    pub fn arb_status() -> impl Strategy<Value = Status> {
        prop_oneof![
            Just(Status::Init),
            Just(Status::Distributing),
            Just(Status::Running),
            Just(Status::Down),
            Just(Status::Err),
        ]
    }
}
