// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! slipway-relay: server-side capabilities of the build control plane.
//!
//! Pipes broker single-writer/single-reader byte channels that move
//! build inputs to workers; the event stream is the append-only,
//! broadcastable log of one build's progress; the hijack handler takes
//! over an accepted connection for interactive sessions.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod events;
mod hijack;
mod pipes;

pub use events::{EventStream, Subscription};
pub use hijack::{accept, AcceptedHijack, SessionError};
pub use pipes::{PipeError, PipeRegistry};
