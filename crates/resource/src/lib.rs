// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! slipway-resource: runs resource versioning scripts inside sandboxes.
//!
//! A resource is checked, fetched, and published by three scripts at
//! fixed paths inside its image; this crate drives them over the
//! [`Sandbox`] execution capability and enforces the JSON protocol.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod runner;
mod sandbox;

#[cfg(any(test, feature = "test-support"))]
mod scripted;

pub use runner::{
    CheckInput, GetInput, ProtocolRunner, PutInput, ResourceSummary, RunnerError,
};
pub use sandbox::{ProcessOutput, ProcessSandbox, ProcessSpec, Sandbox, SandboxError};

#[cfg(any(test, feature = "test-support"))]
pub use scripted::{ScriptedCall, ScriptedSandbox};
