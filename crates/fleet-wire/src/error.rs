// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised while encoding or decoding wire envelopes.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid event type")]
    InvalidEvent,

    #[error("invalid state")]
    InvalidState,

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
