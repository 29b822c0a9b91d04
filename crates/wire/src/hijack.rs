// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Hijack session wire format.
//!
//! A one-shot [`HijackProcessSpec`] request, then newline-delimited JSON
//! frames over the upgraded connection: client→server carries raw input
//! bytes, server→client carries tagged output bytes or exactly one
//! terminal frame (exit status or error). The terminal frame ends the
//! session.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ProtocolError;

/// Process to attach to (or spawn) inside the hijacked container.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HijackProcessSpec {
    pub user: String,
    pub dir: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// Client→server frame: `{"stdin": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputFrame {
    Stdin(Vec<u8>),
}

/// Server→client frame: output bytes tagged by stream, or one terminal
/// frame carrying the exit status or an error string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputFrame {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    ExitStatus(i32),
    Error(String),
}

impl OutputFrame {
    /// Terminal frames end the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OutputFrame::ExitStatus(_) | OutputFrame::Error(_))
    }
}

/// Write one frame followed by a newline, flushing immediately so the
/// channel stays interactive rather than batch.
pub async fn write_frame<W, T>(writer: &mut W, frame: &T) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut bytes = serde_json::to_vec(frame)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one newline-delimited frame. `Ok(None)` means the peer closed
/// the connection; whether that is legal depends on whether a terminal
/// frame was already seen.
pub async fn read_frame<R, T>(reader: &mut R) -> Result<Option<T>, ProtocolError>
where
    R: AsyncBufReadExt + Unpin,
    T: DeserializeOwned,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line.trim_end())?))
}

#[cfg(test)]
#[path = "hijack_tests.rs"]
mod tests;
