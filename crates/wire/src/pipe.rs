// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Pipe allocation response: a server-brokered byte channel.

use serde::{Deserialize, Serialize};

/// Returned by `POST /api/v1/pipes`. Bytes PUT to `write_url` are
/// replayed, in order, to exactly one reader of `read_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeResource {
    pub id: String,
    #[serde(rename = "readURL")]
    pub read_url: String,
    #[serde(rename = "writeURL")]
    pub write_url: String,
}
