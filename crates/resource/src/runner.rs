// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! The resource versioning protocol.
//!
//! Scripts live at fixed paths inside the resource image and are invoked
//! privileged, with no arguments, a single JSON request on stdin, and a
//! single JSON response on stdout. Nonzero exit is always an error
//! regardless of output.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use slipway_core::{MetadataField, Params, Source, Version};

use crate::sandbox::{ProcessSpec, Sandbox, SandboxError};

const CHECK_PATH: &str = "/opt/resource/check";
const IN_PATH: &str = "/opt/resource/in";
const OUT_PATH: &str = "/opt/resource/out";

/// Request for [`ProtocolRunner::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInput {
    /// Selects the sandbox image the script runs in.
    pub resource_type: String,
    pub source: Source,
    /// Last known version; `None` on the first check.
    pub version: Option<Version>,
}

/// Request for [`ProtocolRunner::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetInput {
    pub resource_type: String,
    pub source: Source,
    pub version: Option<Version>,
    pub params: Params,
    /// Directory inside the sandbox the resource is fetched into.
    pub destination: String,
}

/// Request for [`ProtocolRunner::put`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutInput {
    pub resource_type: String,
    pub source: Source,
    pub params: Params,
    /// Directory inside the sandbox the script publishes from.
    pub destination: String,
}

/// Response of a successful in/out script: the resolved version plus
/// whatever metadata pairs the script chose to report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceSummary {
    pub version: Version,
    #[serde(default)]
    pub metadata: Vec<MetadataField>,
}

/// Failure modes of the protocol runner, closed so callers can branch
/// without string matching.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Sandbox unreachable or process unlaunchable; propagated unchanged
    /// since no script output exists yet to report.
    #[error(transparent)]
    Transport(#[from] SandboxError),

    /// The script exited zero but its output violates the protocol.
    /// Never silently tolerated.
    #[error("resource script protocol violation: {0}")]
    ProtocolViolation(String),

    /// The script itself failed. Carries full forensic context: captured
    /// stdout, captured stderr, and the literal exit status, in that
    /// order.
    #[error("{}", failure_message(.stdout, .stderr, *.status))]
    RemoteFailure {
        stdout: String,
        stderr: String,
        status: i32,
    },
}

fn failure_message(stdout: &str, stderr: &str, status: i32) -> String {
    let mut message = String::new();
    for captured in [stdout, stderr] {
        if !captured.is_empty() {
            message.push_str(captured);
            if !captured.ends_with('\n') {
                message.push('\n');
            }
        }
    }
    message.push_str(&format!("exit status {}", status));
    message
}

#[derive(Serialize)]
struct CheckRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a Version>,
    source: &'a Source,
}

#[derive(Serialize)]
struct InRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a Version>,
    source: &'a Source,
    #[serde(skip_serializing_if = "Params::is_empty")]
    params: &'a Params,
    destination: &'a str,
}

#[derive(Serialize)]
struct OutRequest<'a> {
    source: &'a Source,
    #[serde(skip_serializing_if = "Params::is_empty")]
    params: &'a Params,
    destination: &'a str,
}

/// Drives check/in/out scripts through a [`Sandbox`]. Never retries;
/// retry and backoff belong to the orchestration layer above.
pub struct ProtocolRunner<S> {
    sandbox: S,
}

impl<S: Sandbox> ProtocolRunner<S> {
    pub fn new(sandbox: S) -> Self {
        Self { sandbox }
    }

    pub fn sandbox(&self) -> &S {
        &self.sandbox
    }

    /// Run `/opt/resource/check` and return the reported versions,
    /// oldest first, exactly as emitted. An empty list is valid and
    /// means no versions (or no change).
    pub async fn check(&self, input: CheckInput) -> Result<Vec<Version>, RunnerError> {
        let request = CheckRequest {
            version: input.version.as_ref(),
            source: &input.source,
        };
        let stdout = self
            .run_script(&input.resource_type, CHECK_PATH, &request)
            .await?;
        parse_response(&stdout)
    }

    /// Run `/opt/resource/in` to fetch one version into `destination`.
    pub async fn get(&self, input: GetInput) -> Result<ResourceSummary, RunnerError> {
        let request = InRequest {
            version: input.version.as_ref(),
            source: &input.source,
            params: &input.params,
            destination: &input.destination,
        };
        let stdout = self
            .run_script(&input.resource_type, IN_PATH, &request)
            .await?;
        parse_response(&stdout)
    }

    /// Run `/opt/resource/out` to publish from `destination`.
    pub async fn put(&self, input: PutInput) -> Result<ResourceSummary, RunnerError> {
        let request = OutRequest {
            source: &input.source,
            params: &input.params,
            destination: &input.destination,
        };
        let stdout = self
            .run_script(&input.resource_type, OUT_PATH, &request)
            .await?;
        parse_response(&stdout)
    }

    async fn run_script<T: Serialize>(
        &self,
        resource_type: &str,
        path: &str,
        request: &T,
    ) -> Result<Vec<u8>, RunnerError> {
        let stdin = serde_json::to_vec(request)
            .map_err(|e| RunnerError::ProtocolViolation(format!("request encoding: {}", e)))?;

        let output = self
            .sandbox
            .run(ProcessSpec {
                image: resource_type.to_string(),
                path: path.to_string(),
                args: vec![],
                privileged: true,
                stdin,
            })
            .await?;

        if output.status != 0 {
            tracing::warn!(path, status = output.status, "resource script failed");
            return Err(RunnerError::RemoteFailure {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                status: output.status,
            });
        }

        Ok(output.stdout)
    }
}

/// Strictly parse a script's stdout. Invalid UTF-8 or malformed JSON is
/// a hard error even though the process exited zero.
fn parse_response<T: serde::de::DeserializeOwned>(stdout: &[u8]) -> Result<T, RunnerError> {
    let text = std::str::from_utf8(stdout)
        .map_err(|e| RunnerError::ProtocolViolation(format!("non-UTF8 output: {}", e)))?;
    serde_json::from_str(text)
        .map_err(|e| RunnerError::ProtocolViolation(format!("malformed response: {}", e)))
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
