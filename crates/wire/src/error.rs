// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Wire-level protocol errors.

use thiserror::Error;

/// A peer is not honoring the wire contract.
///
/// Always fatal to the current operation; never silently recovered.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),

    #[error("malformed event record: {0}")]
    MalformedEvent(String),

    #[error("connection closed before a terminal frame")]
    PrematureClose,

    #[error("transport: {0}")]
    Transport(#[from] std::io::Error),
}
