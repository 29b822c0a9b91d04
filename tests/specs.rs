// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Workspace-level integration tests: whole-protocol scenarios that
//! cross crate boundaries.

#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

mod specs {
    mod build;
    mod hijack;
    mod resource;
}
