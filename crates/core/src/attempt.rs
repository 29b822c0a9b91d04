// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Attempt paths: where a step sits within nested retry/parallel branching.

use std::fmt;
use std::num::{NonZeroU32, ParseIntError};

use serde::{Deserialize, Serialize};

/// Ordered sequence of positive integers recording a step's position
/// through nested retries: `[1, 1, 2]` is the first attempt of an outer
/// retry, first of a middle retry, second of an inner one.
///
/// Rendered dot-joined (`1.1.2`) for display; serialized as a JSON
/// integer array on the wire. The tie-breaker when otherwise-identical
/// steps need disambiguating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attempt(pub Vec<u32>);

impl Attempt {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a dot-joined path like `1.1.2`. Empty input is the empty
    /// path; segments must be positive, so `0` is rejected.
    pub fn parse(s: &str) -> Result<Self, ParseIntError> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        s.split('.')
            .map(|part| part.parse::<NonZeroU32>().map(NonZeroU32::get))
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for n in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", n)?;
            first = false;
        }
        Ok(())
    }
}

impl From<Vec<u32>> for Attempt {
    fn from(path: Vec<u32>) -> Self {
        Self(path)
    }
}

#[cfg(test)]
#[path = "attempt_tests.rs"]
mod tests;
