// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Composite build plan: a tree of typed steps with stable identity.
//!
//! Every node carries an identifier assigned at construction by a
//! [`PlanFactory`] shared across the whole tree. Identifiers are the join
//! key correlating execution state, retries, and events back to a node,
//! which is what makes partial re-execution and event attribution work.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::mapping::{Params, Source, Version};

/// One node of a build plan. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: u64,
    #[serde(flatten)]
    pub step: Step,
}

/// The typed step payload of a plan node.
///
/// Serializes externally tagged: `{"do": [...]}`, `{"get": {...}}`, etc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Ordered sequence of children, executed sequentially.
    Do(Vec<Plan>),
    /// Unordered set of children, logically parallel.
    Aggregate(Vec<Plan>),
    /// Fetch one version of a resource.
    Get {
        name: String,
        #[serde(rename = "type")]
        resource_type: String,
        source: Source,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<Version>,
    },
    /// Publish to a resource.
    Put {
        name: String,
        #[serde(rename = "type")]
        resource_type: String,
        source: Source,
        #[serde(default, skip_serializing_if = "Params::is_empty")]
        params: Params,
    },
    /// Run a user task.
    Task { name: String, config: TaskConfig },
}

/// Task configuration as loaded from a task file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskConfig {
    pub platform: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<TaskInput>,
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub params: Params,
    pub run: RunConfig,
}

/// A declared task input directory, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    pub name: String,
}

/// Command a task runs inside its container.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunConfig {
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// Assigns node identifiers for one plan tree.
///
/// Passed by reference to whoever assembles the tree; the counter is
/// atomic so assembly may be concurrent. No ambient global state.
#[derive(Debug)]
pub struct PlanFactory {
    next: AtomicU64,
}

impl PlanFactory {
    /// Factory starting at `first + 1` (the first plan gets `first + 1`).
    pub fn new(first: u64) -> Self {
        Self { next: AtomicU64::new(first) }
    }

    /// Wrap a step in a plan node with the next identifier.
    ///
    /// Children of composite steps keep the identifiers they were built
    /// with; only the new node receives one. Cannot fail: malformed step
    /// configuration is caught by downstream consumers.
    pub fn new_plan(&self, step: Step) -> Plan {
        Plan {
            id: self.next.fetch_add(1, Ordering::Relaxed) + 1,
            step,
        }
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
