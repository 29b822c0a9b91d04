// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Build progress events.
//!
//! Events are immutable once emitted; the relay assigns each one a
//! monotonically increasing sequence number at emission. The `origin`
//! plan identifier is the join key attributing an event to one node of
//! the submitted plan.

use serde::{Deserialize, Serialize};

use crate::mapping::Version;

/// Which plan node an event belongs to, and which of its output streams.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Origin {
    /// Plan node identifier.
    pub id: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
}

/// Overall state of one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    Started,
    Succeeded,
    Failed,
    Errored,
    Aborted,
}

impl BuildStatus {
    /// Terminal statuses end the event stream.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BuildStatus::Started)
    }

    /// Process exit code a client derives from a terminal status.
    pub fn exit_code(&self) -> i32 {
        match self {
            BuildStatus::Started | BuildStatus::Succeeded => 0,
            BuildStatus::Failed => 1,
            BuildStatus::Errored | BuildStatus::Aborted => 2,
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BuildStatus::Started => "started",
            BuildStatus::Succeeded => "succeeded",
            BuildStatus::Failed => "failed",
            BuildStatus::Errored => "errored",
            BuildStatus::Aborted => "aborted",
        };
        write!(f, "{}", s)
    }
}

/// One name/value pair of resource metadata reported by in/out scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    pub name: String,
    pub value: String,
}

/// One record of a build's event stream.
///
/// Serializes with `{"type": "event:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Raw output from a step's stdout or stderr.
    #[serde(rename = "build:log")]
    Log { origin: Origin, payload: String },

    /// Build status transition.
    #[serde(rename = "build:status")]
    Status { status: BuildStatus, time: u64 },

    /// A task container is being prepared.
    #[serde(rename = "build:initialize-task")]
    InitializeTask { origin: Origin },

    /// The task process started.
    #[serde(rename = "build:start-task")]
    StartTask { origin: Origin, time: u64 },

    /// A get step finished: structured input summary.
    #[serde(rename = "build:finish-get")]
    FinishGet {
        origin: Origin,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<Version>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        metadata: Vec<MetadataField>,
        exit_status: i32,
    },

    /// A put step finished: structured output summary.
    #[serde(rename = "build:finish-put")]
    FinishPut {
        origin: Origin,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<Version>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        metadata: Vec<MetadataField>,
        exit_status: i32,
    },

    /// A task step finished with the given exit status.
    #[serde(rename = "build:finish-task")]
    FinishTask { origin: Origin, exit_status: i32 },

    /// Something went wrong outside a step's own output.
    #[serde(rename = "build:error")]
    Error {
        message: String,
        #[serde(default)]
        origin: Origin,
    },
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
