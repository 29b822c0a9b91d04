// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Server-push event feed framing.
//!
//! Records are `id:`/`event:`/`data:` lines separated by a blank line.
//! Build events travel as `event: event` with a `{"event": ...}` payload
//! and a monotonically increasing `id`; a distinguished `event: end`
//! record terminates the feed.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use slipway_core::Event;

use crate::error::ProtocolError;

/// Payload wrapper for `event: event` records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: Event,
}

/// One parsed feed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseRecord {
    pub id: Option<u64>,
    pub name: String,
    pub data: String,
}

impl SseRecord {
    pub fn is_end(&self) -> bool {
        self.name == "end"
    }

    /// Decode the build event carried by an `event: event` record.
    pub fn event(&self) -> Result<Event, ProtocolError> {
        let envelope: EventEnvelope = serde_json::from_str(&self.data)?;
        Ok(envelope.event)
    }
}

/// Writes feed records to a byte stream.
pub struct SseWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> SseWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Emit one event record with its sequence number.
    pub async fn write_event(&mut self, id: u64, event: &Event) -> Result<(), ProtocolError> {
        let data = serde_json::to_string(&EventEnvelope { event: event.clone() })?;
        let record = format!("id: {}\nevent: event\ndata: {}\n\n", id, data);
        self.writer.write_all(record.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Emit the distinguished end record and flush.
    pub async fn write_end(&mut self) -> Result<(), ProtocolError> {
        self.writer.write_all(b"event: end\ndata: \n\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// Reads feed records from a byte stream.
pub struct SseReader<R> {
    reader: R,
}

impl<R: AsyncBufReadExt + Unpin> SseReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read the next record. `Ok(None)` means the stream closed; callers
    /// decide whether that is premature (no `end` record seen yet).
    pub async fn next(&mut self) -> Result<Option<SseRecord>, ProtocolError> {
        let mut id = None;
        let mut name = None;
        let mut data = None;
        loop {
            let mut line = String::new();
            let n = self.reader.read_line(&mut line).await?;
            if n == 0 {
                // Mid-record EOF loses fields silently otherwise.
                if name.is_some() || id.is_some() {
                    return Err(ProtocolError::PrematureClose);
                }
                return Ok(None);
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                // Blank line before any field: skip keep-alive padding.
                match name.take() {
                    Some(name) => {
                        return Ok(Some(SseRecord {
                            id,
                            name,
                            data: data.unwrap_or_default(),
                        }))
                    }
                    None => continue,
                }
            } else if let Some(value) = line.strip_prefix("id:") {
                let value = value.trim();
                let parsed = value.parse().map_err(|_| {
                    ProtocolError::MalformedEvent(format!("bad record id {}", value))
                })?;
                id = Some(parsed);
            } else if let Some(value) = line.strip_prefix("event:") {
                name = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("data:") {
                data = Some(value.trim().to_string());
            } else {
                return Err(ProtocolError::MalformedEvent(format!(
                    "unrecognized feed line: {}",
                    line
                )));
            }
        }
    }
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;
