// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination.

use std::fmt;

/// Sentinel for "the hijack mechanism failed", distinct from any
/// mirrored remote exit status.
pub const HIJACK_FAILED: i32 = 255;

/// "No containers matched": low severity, distinct from hijack failure.
pub const NO_CONTAINERS: i32 = 1;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Exit with a code but nothing to print (message already rendered,
    /// or the code alone is the outcome).
    pub fn silent(code: i32) -> Self {
        Self::new(code, "")
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}
