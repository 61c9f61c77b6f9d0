//! The single hub connection shared by every room operation.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use pizarra_common::SyncError;

use super::types::{ConnectionStatus, TransportEvent};

/// Buffered inbound events between the transport and the session.
const EVENT_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// Transport seam
// ---------------------------------------------------------------------------

/// A bidirectional, self-reconnecting event channel to the hub.
///
/// `open` starts the transport; from then on it reports lifecycle changes
/// and inbound events on `events` until `close` is called.
pub trait Transport: Send {
    fn open(&mut self, events: mpsc::Sender<TransportEvent>);
    fn close(&mut self);
    /// Whether an emit issued now would be delivered.
    fn is_open(&self) -> bool;
    fn send(&mut self, event: &str, payload: serde_json::Value) -> Result<(), SyncError>;
}

/// Anything that can push a named event toward the hub.
pub trait Emitter {
    /// Returns whether the event was handed to the transport.
    fn emit(&mut self, event: &str, payload: serde_json::Value) -> bool;
}

type EventHandler = Box<dyn FnMut(&serde_json::Value) + Send>;

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Owns the transport, its inbound queue, and any raw event handlers.
pub struct ConnectionManager<T: Transport> {
    transport: T,
    events: Option<mpsc::Receiver<TransportEvent>>,
    handlers: HashMap<String, Vec<EventHandler>>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            events: None,
            handlers: HashMap::new(),
        }
    }

    /// Start the transport unless it is already running.
    pub fn connect(&mut self) {
        if self.events.is_some() {
            debug!("Hub connection already started");
            return;
        }
        info!("Opening hub connection");
        let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);
        self.transport.open(event_tx);
        self.events = Some(event_rx);
    }

    /// Stop the transport and drop anything still queued from it.
    pub fn disconnect(&mut self) {
        if self.events.take().is_some() {
            info!("Closing hub connection");
            self.transport.close();
        }
    }

    /// Whether `connect` has been called without a matching `disconnect`.
    pub fn is_started(&self) -> bool {
        self.events.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.events.is_some() && self.transport.is_open()
    }

    pub fn status(&self) -> ConnectionStatus {
        match (self.is_started(), self.transport.is_open()) {
            (false, _) => ConnectionStatus::Disconnected,
            (true, true) => ConnectionStatus::Connected,
            (true, false) => ConnectionStatus::Connecting,
        }
    }

    /// Register a handler run once per inbound occurrence of `event`.
    pub fn on_event<F>(&mut self, event: &str, handler: F)
    where
        F: FnMut(&serde_json::Value) + Send + 'static,
    {
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push(Box::new(handler));
    }

    /// Wait for the next transport event. `None` once disconnected.
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        let event = self.events.as_mut()?.recv().await?;
        self.run_handlers(&event);
        Some(event)
    }

    /// Next already-queued transport event, without waiting.
    pub fn try_recv(&mut self) -> Option<TransportEvent> {
        let event = self.events.as_mut()?.try_recv().ok()?;
        self.run_handlers(&event);
        Some(event)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn run_handlers(&mut self, event: &TransportEvent) {
        if let TransportEvent::Message { event, payload } = event {
            if let Some(handlers) = self.handlers.get_mut(event) {
                for handler in handlers.iter_mut() {
                    handler(payload);
                }
            }
        }
    }
}

impl<T: Transport> Emitter for ConnectionManager<T> {
    /// Never queues: an emit while disconnected is logged and dropped.
    fn emit(&mut self, event: &str, payload: serde_json::Value) -> bool {
        if !self.is_connected() {
            warn!(event = %event, "Dropping emit while disconnected from hub");
            return false;
        }
        match self.transport.send(event, payload) {
            Ok(()) => {
                debug!(event = %event, "Emitted to hub");
                true
            }
            Err(e) => {
                warn!(event = %event, error = %e, "Failed to emit to hub");
                false
            }
        }
    }
}

impl<T: Transport> Drop for ConnectionManager<T> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
