// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Wire contracts shared by the Slipway client and relay.
//!
//! Hijack frames are newline-delimited JSON over an upgraded connection;
//! the event feed is a server-push stream of named events; container
//! queries are conjunctive URL parameters.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod build;
mod error;
mod hijack;
mod pipe;
mod query;
mod sse;

pub use build::BuildSummary;
pub use error::ProtocolError;
pub use hijack::{read_frame, write_frame, HijackProcessSpec, InputFrame, OutputFrame};
pub use pipe::PipeResource;
pub use query::ContainerFilter;
pub use sse::{EventEnvelope, SseReader, SseRecord, SseWriter};
