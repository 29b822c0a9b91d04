// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! CLI command implementations

pub mod execute;
pub mod hijack;
