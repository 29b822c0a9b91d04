// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Pipe registry: server-brokered byte channels.
//!
//! Each pipe has one write endpoint and one read endpoint; bytes PUT to
//! the write side are replayed, in order, to the single reader. A pipe
//! ends when the writer closes or the consuming step is done with it.

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::io::{ReadHalf, SimplexStream, WriteHalf};

/// Buffer between writer and reader before backpressure applies.
const PIPE_BUFFER: usize = 64 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipeError {
    #[error("no such pipe: {0}")]
    NotFound(String),

    #[error("pipe {0} already has a {1}")]
    EndpointClaimed(String, &'static str),
}

struct PipeEnds {
    reader: Option<ReadHalf<SimplexStream>>,
    writer: Option<WriteHalf<SimplexStream>>,
}

/// Allocates pipes and hands out each endpoint at most once.
#[derive(Default)]
pub struct PipeRegistry {
    pipes: Mutex<HashMap<String, PipeEnds>>,
}

impl PipeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a pipe and return its id.
    pub fn create(&self) -> String {
        let id = nanoid::nanoid!(19);
        let (reader, writer) = tokio::io::simplex(PIPE_BUFFER);
        self.pipes.lock().insert(
            id.clone(),
            PipeEnds { reader: Some(reader), writer: Some(writer) },
        );
        tracing::debug!(pipe = %id, "allocated pipe");
        id
    }

    /// Claim the single write endpoint. Dropping it closes the pipe,
    /// which the reader observes as EOF.
    pub fn take_writer(&self, id: &str) -> Result<WriteHalf<SimplexStream>, PipeError> {
        let mut pipes = self.pipes.lock();
        let ends = pipes.get_mut(id).ok_or_else(|| PipeError::NotFound(id.into()))?;
        ends.writer
            .take()
            .ok_or_else(|| PipeError::EndpointClaimed(id.into(), "writer"))
    }

    /// Claim the single read endpoint.
    pub fn take_reader(&self, id: &str) -> Result<ReadHalf<SimplexStream>, PipeError> {
        let mut pipes = self.pipes.lock();
        let ends = pipes.get_mut(id).ok_or_else(|| PipeError::NotFound(id.into()))?;
        ends.reader
            .take()
            .ok_or_else(|| PipeError::EndpointClaimed(id.into(), "reader"))
    }

    /// Drop a pipe once its consuming build step completes.
    pub fn remove(&self, id: &str) {
        self.pipes.lock().remove(id);
    }
}

#[cfg(test)]
#[path = "pipes_tests.rs"]
mod tests;
