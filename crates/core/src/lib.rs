// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! slipway-core: data model for the Slipway build control plane.
//!
//! Pure data, no I/O: the composite build plan, the opaque string
//! mappings exchanged with resource scripts, container records with
//! attempt paths, and the build event model.

pub mod attempt;
pub mod container;
pub mod event;
pub mod mapping;
pub mod plan;

pub use attempt::Attempt;
pub use container::{ContainerRecord, StepType};
pub use event::{BuildStatus, Event, MetadataField, Origin};
pub use mapping::{Params, Source, Version};
pub use plan::{Plan, PlanFactory, RunConfig, Step, TaskConfig, TaskInput};
