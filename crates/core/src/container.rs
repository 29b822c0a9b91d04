// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Container records: one sandbox as the container index reports it.

use serde::{Deserialize, Serialize};

use crate::attempt::Attempt;

/// Which kind of step a container is (or was) running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Get,
    Put,
    Task,
    Check,
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StepType::Get => "get",
            StepType::Put => "put",
            StepType::Task => "task",
            StepType::Check => "check",
        };
        write!(f, "{}", s)
    }
}

/// Identifies one sandbox in the container index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    /// Sandbox handle, the key used to open a hijack session.
    pub handle: String,
    pub worker_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pipeline_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub job_name: String,
    pub build_id: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub build_name: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub step_name: String,
    /// Set for `check` containers, which belong to a resource rather
    /// than a build step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    pub working_directory: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    pub user: String,
    #[serde(default, skip_serializing_if = "Attempt::is_empty")]
    pub attempt: Attempt,
}

impl ContainerRecord {
    /// Menu line shown when multiple containers match an operator query.
    pub fn menu_line(&self) -> String {
        let mut line = format!(
            "build #{}, step: {}, type: {}",
            self.build_name, self.step_name, self.step_type
        );
        if !self.attempt.is_empty() {
            line.push_str(&format!(", attempt: {}", self.attempt));
        }
        line
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;
