// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Scripted sandbox for tests: canned responses, recorded invocations.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::sandbox::{ProcessOutput, ProcessSpec, Sandbox, SandboxError};

/// One canned script invocation result.
#[derive(Debug, Clone)]
pub struct ScriptedCall {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub status: i32,
}

impl ScriptedCall {
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self { stdout: stdout.into(), stderr: Vec::new(), status: 0 }
    }

    pub fn failing(status: i32, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self { stdout: stdout.into(), stderr: stderr.into(), status }
    }
}

/// Sandbox returning queued responses in order, recording every spec it
/// was asked to run.
#[derive(Debug, Default)]
pub struct ScriptedSandbox {
    responses: Mutex<VecDeque<Result<ScriptedCall, String>>>,
    calls: Mutex<Vec<ProcessSpec>>,
}

impl ScriptedSandbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, call: ScriptedCall) {
        self.responses.lock().push_back(Ok(call));
    }

    /// Queue a transport-level failure for the next invocation.
    pub fn enqueue_transport_error(&self, message: impl Into<String>) {
        self.responses.lock().push_back(Err(message.into()));
    }

    /// Every spec run so far, in invocation order.
    pub fn calls(&self) -> Vec<ProcessSpec> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Sandbox for ScriptedSandbox {
    async fn run(&self, spec: ProcessSpec) -> Result<ProcessOutput, SandboxError> {
        self.calls.lock().push(spec);
        match self.responses.lock().pop_front() {
            Some(Ok(call)) => Ok(ProcessOutput {
                stdout: call.stdout,
                stderr: call.stderr,
                status: call.status,
            }),
            Some(Err(message)) => Err(SandboxError::Spawn(std::io::Error::other(message))),
            None => Err(SandboxError::Spawn(std::io::Error::other(
                "scripted sandbox: no response queued",
            ))),
        }
    }
}
