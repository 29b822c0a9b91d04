// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Append-only, broadcastable event stream for one build.
//!
//! The orchestrator emits; any number of clients subscribe. Emission
//! assigns each event the next sequence number; events are immutable
//! once emitted. Readers never contend for a lock with each other, only
//! for a read position: each subscription owns its own cursor and
//! replays the full history before following live.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use slipway_core::Event;

struct Shared {
    events: RwLock<Vec<Event>>,
    // (appended count, closed); bumped on every emit and on close.
    progress: watch::Sender<(usize, bool)>,
}

/// The ordered event log of one build.
#[derive(Clone)]
pub struct EventStream {
    shared: Arc<Shared>,
}

impl Default for EventStream {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStream {
    pub fn new() -> Self {
        let (progress, _) = watch::channel((0, false));
        Self {
            shared: Arc::new(Shared { events: RwLock::new(Vec::new()), progress }),
        }
    }

    /// Append an event, returning its sequence number. Emitting after
    /// [`close`](Self::close) drops the event; the closed marker must
    /// survive so drained subscribers still observe the end.
    pub fn emit(&self, event: Event) -> u64 {
        let mut events = self.shared.events.write();
        if self.shared.progress.borrow().1 {
            tracing::warn!("event emitted after close, dropping");
            return events.len() as u64;
        }
        let seq = events.len() as u64;
        events.push(event);
        // Published under the write lock so a concurrent close cannot
        // slip between the append and the progress bump.
        self.shared.progress.send_replace((events.len(), false));
        seq
    }

    /// Close the stream. No further events may be emitted; subscribers
    /// drain what remains and then observe the end.
    pub fn close(&self) {
        let events = self.shared.events.write();
        self.shared.progress.send_replace((events.len(), true));
    }

    /// Subscribe from sequence zero: full replay, then live tailing.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            shared: Arc::clone(&self.shared),
            cursor: 0,
            progress: self.shared.progress.subscribe(),
        }
    }
}

/// One reader's position in the stream.
pub struct Subscription {
    shared: Arc<Shared>,
    cursor: usize,
    progress: watch::Receiver<(usize, bool)>,
}

impl Subscription {
    /// Next `(sequence, event)` pair, in strictly increasing sequence
    /// order. `None` once the stream is closed and fully drained.
    pub async fn next(&mut self) -> Option<(u64, Event)> {
        loop {
            {
                let events = self.shared.events.read();
                if self.cursor < events.len() {
                    let seq = self.cursor as u64;
                    let event = events[self.cursor].clone();
                    self.cursor += 1;
                    return Some((seq, event));
                }
            }
            let (len, closed) = *self.progress.borrow();
            if closed && self.cursor >= len {
                return None;
            }
            // Wait for the next emit or close.
            if self.progress.changed().await.is_err() {
                return None;
            }
        }
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
