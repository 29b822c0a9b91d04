// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Sandbox execution capability.
//!
//! Container lifecycle and placement are someone else's problem; this is
//! the seam the protocol runner sees: run one process in an isolated
//! environment, feed it stdin, capture stdout/stderr, report its exit.

use async_trait::async_trait;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// One process to run inside a sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    /// Image the sandbox is built from (selected by resource type).
    pub image: String,
    /// Absolute path of the executable, invoked with no arguments for
    /// resource scripts.
    pub path: String,
    pub args: Vec<String>,
    pub privileged: bool,
    /// Fed to the process's standard input, then closed.
    pub stdin: Vec<u8>,
}

/// Captured result of a sandboxed process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub status: i32,
}

/// Transport-level sandbox failure: the process could not be launched or
/// the sandbox became unreachable. Never retried at this layer.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("sandbox spawn failed: {0}")]
    Spawn(std::io::Error),

    #[error("sandbox i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Executes processes in isolated environments.
///
/// Implementations must capture stdout and stderr concurrently with the
/// process running; a script may emit more than pipe-buffer capacity
/// before exiting.
#[async_trait]
pub trait Sandbox: Send + Sync {
    async fn run(&self, spec: ProcessSpec) -> Result<ProcessOutput, SandboxError>;
}

/// Runs sandbox processes as local child processes.
///
/// The in-tree implementation used by the relay and integration tests;
/// real deployments substitute a container-backed sandbox behind the
/// same trait.
#[derive(Debug, Clone, Default)]
pub struct ProcessSandbox;

#[async_trait]
impl Sandbox for ProcessSandbox {
    async fn run(&self, spec: ProcessSpec) -> Result<ProcessOutput, SandboxError> {
        tracing::debug!(path = %spec.path, image = %spec.image, "spawning sandbox process");

        let mut child = tokio::process::Command::new(&spec.path)
            .args(&spec.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(SandboxError::Spawn)?;

        // Feed stdin from its own task so a script that fills its output
        // pipes before reading input cannot deadlock against us.
        let stdin_bytes = spec.stdin;
        let mut stdin = child.stdin.take();
        let feeder = tokio::spawn(async move {
            if let Some(handle) = stdin.as_mut() {
                let _ = handle.write_all(&stdin_bytes).await;
                let _ = handle.shutdown().await;
            }
        });

        // wait_with_output drains stdout and stderr concurrently while
        // the process runs.
        let output = child.wait_with_output().await?;
        let _ = feeder.await;

        Ok(ProcessOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            status: output.status.code().unwrap_or(-1),
        })
    }
}
