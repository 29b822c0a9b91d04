// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Build listing/submission response types.

use serde::{Deserialize, Serialize};

use slipway_core::BuildStatus;

/// One build as the build API reports it. One-off builds have no
/// pipeline/job identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pipeline_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub job_name: String,
    pub status: BuildStatus,
}

impl BuildSummary {
    /// One-off builds are submitted directly rather than by a job.
    pub fn is_one_off(&self) -> bool {
        self.job_name.is_empty()
    }
}
