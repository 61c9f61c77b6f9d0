//! In-process stand-in for the hub.
//!
//! `MemoryHub` is the test-side handle: it decides when the socket is
//! accepted or dropped, injects inbound events, and records every emit.
//! `MemoryTransport` is what gets handed to `ConnectionManager`.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::debug;

use pizarra_common::SyncError;

use super::manager::Transport;
use super::types::TransportEvent;

#[derive(Default)]
struct HubState {
    events: Option<mpsc::Sender<TransportEvent>>,
    open: bool,
    manual: bool,
    sent: Vec<(String, serde_json::Value)>,
    opens: usize,
    closes: usize,
}

impl HubState {
    fn push(&self, event: TransportEvent) {
        match &self.events {
            Some(tx) => {
                if tx.try_send(event).is_err() {
                    debug!("Memory hub event dropped: receiver gone or full");
                }
            }
            None => debug!("Memory hub event dropped: transport not open"),
        }
    }
}

/// Test-side handle to an in-memory hub.
#[derive(Clone, Default)]
pub struct MemoryHub {
    state: Arc<Mutex<HubState>>,
}

impl MemoryHub {
    /// A hub that accepts the socket as soon as the transport opens.
    pub fn new() -> Self {
        Self::default()
    }

    /// A hub that leaves the socket connecting until [`MemoryHub::accept`].
    pub fn manual() -> Self {
        let hub = Self::default();
        hub.lock().manual = true;
        hub
    }

    pub fn transport(&self) -> MemoryTransport {
        MemoryTransport { hub: self.clone() }
    }

    /// Complete the handshake (or a reconnect).
    pub fn accept(&self) {
        let mut state = self.lock();
        state.open = true;
        state.push(TransportEvent::Connected);
    }

    /// Simulate a dropped socket.
    pub fn drop_connection(&self) {
        let mut state = self.lock();
        state.open = false;
        state.push(TransportEvent::Disconnected);
    }

    /// Simulate a failed connection attempt.
    pub fn fail(&self, message: &str) {
        self.lock().push(TransportEvent::Error(message.to_string()));
    }

    /// Deliver a named event from the hub.
    pub fn deliver(&self, event: &str, payload: serde_json::Value) {
        self.lock().push(TransportEvent::Message {
            event: event.to_string(),
            payload,
        });
    }

    /// Everything emitted so far, in order.
    pub fn sent(&self) -> Vec<(String, serde_json::Value)> {
        self.lock().sent.clone()
    }

    /// Payloads emitted under `event`, in order.
    pub fn sent_named(&self, event: &str) -> Vec<serde_json::Value> {
        self.lock()
            .sent
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn take_sent(&self) -> Vec<(String, serde_json::Value)> {
        std::mem::take(&mut self.lock().sent)
    }

    pub fn open_count(&self) -> usize {
        self.lock().opens
    }

    pub fn close_count(&self) -> usize {
        self.lock().closes
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Transport half of a [`MemoryHub`].
pub struct MemoryTransport {
    hub: MemoryHub,
}

impl Transport for MemoryTransport {
    fn open(&mut self, events: mpsc::Sender<TransportEvent>) {
        let mut state = self.hub.lock();
        state.events = Some(events);
        state.opens += 1;
        if !state.manual {
            state.open = true;
            state.push(TransportEvent::Connected);
        }
    }

    fn close(&mut self) {
        let mut state = self.hub.lock();
        state.events = None;
        state.open = false;
        state.closes += 1;
    }

    fn is_open(&self) -> bool {
        self.hub.lock().open
    }

    fn send(&mut self, event: &str, payload: serde_json::Value) -> Result<(), SyncError> {
        let mut state = self.hub.lock();
        if !state.open {
            return Err(SyncError::NotConnected);
        }
        state.sent.push((event.to_string(), payload));
        Ok(())
    }
}
