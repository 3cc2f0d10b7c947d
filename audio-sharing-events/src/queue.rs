//! Hand-off of callback events to the owning thread
//!
//! Profile callbacks fire on a binder/callback thread. They only post into
//! an `EventSink`; the thread that owns the dialog state drains the
//! matching `EventQueue` and handles the events there.

use std::sync::{mpsc, Arc};

use parking_lot::Mutex;

use crate::error::{EventError, Result};
use crate::event::SharingEvent;

/// Create a connected sink/queue pair
pub fn channel() -> (EventSink, EventQueue) {
    let (tx, rx) = mpsc::channel();
    (
        EventSink { tx },
        EventQueue {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Posting side handed to callback sources
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<SharingEvent>,
}

impl EventSink {
    /// Post an event for the owning thread
    pub fn post(&self, event: impl Into<SharingEvent>) -> Result<()> {
        self.tx
            .send(event.into())
            .map_err(|_| EventError::ChannelClosed)
    }
}

/// Receiving side, drained on the owning thread
pub struct EventQueue {
    rx: Arc<Mutex<mpsc::Receiver<SharingEvent>>>,
}

impl EventQueue {
    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<SharingEvent> {
        self.rx.lock().try_recv().ok()
    }

    /// Take every event that is currently queued
    pub fn drain(&self) -> Vec<SharingEvent> {
        let rx = self.rx.lock();
        rx.try_iter().collect()
    }

    /// Non-blocking iterator over currently queued events
    pub fn try_iter(&self) -> TryIterator<'_> {
        TryIterator { inner: self }
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue").finish_non_exhaustive()
    }
}

/// Non-blocking iterator over queued events
pub struct TryIterator<'a> {
    inner: &'a EventQueue,
}

impl<'a> Iterator for TryIterator<'a> {
    type Item = SharingEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}
