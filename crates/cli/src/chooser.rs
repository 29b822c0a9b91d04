// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Disambiguation menu for container selection.
//!
//! Pure: the menu is rendered to a string and the operator's reply is a
//! line of text, so the whole exchange is unit-testable without a
//! terminal.

use slipway_core::ContainerRecord;
use thiserror::Error;

/// Fixed operator-facing message for an empty result.
pub const NO_MATCHES_MESSAGE: &str =
    "no containers matched your search parameters!\n\nthey may have expired if your build hasn't recently finished.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChooseError {
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}

/// Render the 1-indexed menu shown when multiple containers match, in
/// query order.
pub fn render_menu(candidates: &[ContainerRecord]) -> String {
    let mut menu = String::from("containers:\n");
    for (i, candidate) in candidates.iter().enumerate() {
        menu.push_str(&format!("  {}. {}\n", i + 1, candidate.menu_line()));
    }
    menu.push_str("choose a container: ");
    menu
}

/// Resolve one line of operator input to an index into `candidates`.
pub fn choose(candidates: &[ContainerRecord], input: &str) -> Result<usize, ChooseError> {
    let trimmed = input.trim();
    let selection: usize = trimmed
        .parse()
        .map_err(|_| ChooseError::InvalidSelection(trimmed.to_string()))?;
    if selection == 0 || selection > candidates.len() {
        return Err(ChooseError::InvalidSelection(trimmed.to_string()));
    }
    Ok(selection - 1)
}

#[cfg(test)]
#[path = "chooser_tests.rs"]
mod tests;
