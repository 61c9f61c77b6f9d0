//! Room session: composes the connection, presence, editor claim, and
//! document into the API the rest of the application uses.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use pizarra_common::{EventBus, SyncError};

use crate::auth::AuthProvider;
use crate::connection::{ConnectionManager, ConnectionStatus, Emitter, Transport, TransportEvent};
use crate::document::{
    Changes, ComponentId, Document, DocumentSynchronizer, EditContext, Properties,
};
use crate::editor::EditorArbitrator;
use crate::presence::PresenceTracker;
use crate::protocol::{
    events, CodeGenerationPayload, EditorClaim, GeneratedCode, InboundEvent, JoinRoomPayload,
    User,
};

use super::types::{SessionOptions, SessionUpdate};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One joined room at a time, over one shared hub connection.
///
/// All state is mutated either by a method call or by
/// [`handle_event`](Self::handle_event); nothing runs concurrently with it.
pub struct RoomSession<T: Transport> {
    connection: ConnectionManager<T>,
    auth: Arc<dyn AuthProvider>,
    options: SessionOptions,
    room_id: Option<String>,
    /// Whether `joinRoom` went out on the current socket.
    joined: bool,
    document: DocumentSynchronizer,
    presence: PresenceTracker,
    editor: EditorArbitrator,
    generated_code: Option<GeneratedCode>,
    updates: EventBus<SessionUpdate>,
}

impl<T: Transport> RoomSession<T> {
    pub fn new(transport: T, auth: Arc<dyn AuthProvider>, options: SessionOptions) -> Self {
        let updates = EventBus::new(options.event_capacity);
        Self {
            connection: ConnectionManager::new(transport),
            auth,
            options,
            room_id: None,
            joined: false,
            document: DocumentSynchronizer::new(),
            presence: PresenceTracker::new(),
            editor: EditorArbitrator::new(),
            generated_code: None,
            updates,
        }
    }

    // -- Room lifecycle -----------------------------------------------------

    /// Join `room_id`, discarding any state from a previous room.
    ///
    /// Needs a token up front. The join request goes out now if the hub is
    /// connected, otherwise as soon as it is.
    pub fn join(&mut self, room_id: &str) -> Result<(), SyncError> {
        if self.auth.token().is_none() {
            return Err(SyncError::NotAuthenticated);
        }
        if let Some(previous) = self.room_id.take() {
            info!(from = %previous, to = %room_id, "Switching rooms");
        }
        self.reset_state();
        self.room_id = Some(room_id.to_string());

        self.connection.connect();
        if self.connection.is_connected() {
            self.send_join();
        } else {
            debug!(room = %room_id, "Hub not connected yet; join deferred");
        }
        info!(room = %room_id, "Joined room");
        Ok(())
    }

    /// Forget the current room. Closes the connection only when
    /// `disconnect_on_leave` is set.
    pub fn leave(&mut self) {
        if let Some(room) = self.room_id.take() {
            info!(room = %room, "Leaving room");
        }
        self.reset_state();
        if self.options.disconnect_on_leave {
            self.disconnect();
        }
    }

    /// Leave and always close the connection.
    pub fn cleanup(&mut self) {
        self.leave();
        self.disconnect();
    }

    /// Open the hub connection without joining anything.
    pub fn connect(&mut self) {
        self.connection.connect();
    }

    fn disconnect(&mut self) {
        if self.connection.is_started() {
            self.connection.disconnect();
            self.publish(SessionUpdate::Connection(ConnectionStatus::Disconnected));
        }
    }

    fn reset_state(&mut self) {
        self.joined = false;
        self.generated_code = None;
        let changes = Changes {
            document: self.document.reset(),
            editor: self.editor.clear(),
        };
        let presence_changed = self.presence.clear();
        self.publish_changes(changes);
        if presence_changed {
            self.publish_presence();
        }
    }

    fn send_join(&mut self) {
        let (Some(room_id), Some(token)) = (self.room_id.as_deref(), self.auth.token()) else {
            warn!("Cannot send join request without a room and a token");
            return;
        };
        let payload = JoinRoomPayload {
            room_id,
            token: &token,
        };
        match serde_json::to_value(&payload) {
            Ok(value) => self.joined = self.connection.emit(events::JOIN_ROOM, value),
            Err(e) => warn!(error = %e, "Failed to encode join request"),
        }
    }

    // -- Edits --------------------------------------------------------------

    /// Add a component and return its new id.
    pub fn add_component(&mut self, properties: Properties) -> ComponentId {
        let (id, changes) = self.edit(|doc, ctx| doc.add_component(ctx, properties));
        self.publish_changes(changes);
        id
    }

    /// Returns false if no component has that id.
    pub fn update_component(&mut self, id: &str, patch: &Properties) -> bool {
        if !self.document.document().contains(id) {
            return false;
        }
        let changes = self.edit(|doc, ctx| doc.update_component(ctx, id, patch));
        self.publish_changes(changes);
        true
    }

    /// Returns false if no component has that id.
    pub fn remove_component(&mut self, id: &str) -> bool {
        if !self.document.document().contains(id) {
            return false;
        }
        let changes = self.edit(|doc, ctx| doc.remove_component(ctx, id));
        self.publish_changes(changes);
        true
    }

    /// Arbitrary whole-document edit; `touched` names the component the
    /// local user is working on, if any.
    pub fn apply_local_edit<F>(&mut self, touched: Option<ComponentId>, mutator: F)
    where
        F: FnOnce(&Document) -> Document,
    {
        let changes = self.edit(|doc, ctx| doc.apply_local_edit(ctx, touched, mutator));
        self.publish_changes(changes);
    }

    /// Seed the document from an authoritative snapshot (e.g. the room
    /// directory's copy) right after joining.
    pub fn resync_from_room_snapshot(&mut self, document: Document) {
        if self.document.resync_from_room_snapshot(document) {
            self.publish(SessionUpdate::DocumentChanged(self.document.document().clone()));
        }
    }

    /// Ask the hub to generate code for the current room. The result
    /// arrives later as [`SessionUpdate::CodeGenerated`].
    pub fn request_code_generation(&mut self) -> Result<(), SyncError> {
        let room_id = self.room_id.as_deref().ok_or(SyncError::NoActiveRoom)?;
        let token = self.auth.token().ok_or(SyncError::NotAuthenticated)?;
        let payload = serde_json::to_value(CodeGenerationPayload {
            room_id,
            token: &token,
        })
        .map_err(|e| SyncError::Protocol(e.to_string()))?;
        if self.connection.emit(events::GENERATE_CODE, payload) {
            info!(room = %room_id, "Requested code generation");
            Ok(())
        } else {
            Err(SyncError::NotConnected)
        }
    }

    fn edit<R>(&mut self, f: impl FnOnce(&mut DocumentSynchronizer, EditContext<'_>) -> R) -> R {
        let ctx = EditContext {
            room_id: self.room_id.as_deref(),
            auth: self.auth.as_ref(),
            editor: &mut self.editor,
            outbox: &mut self.connection,
        };
        f(&mut self.document, ctx)
    }

    // -- Inbound ------------------------------------------------------------

    /// Wait for and apply the next transport event. Returns false once the
    /// connection has been closed.
    pub async fn process_next(&mut self) -> bool {
        match self.connection.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply every event already queued, without waiting. Returns how many.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.connection.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => self.on_connected(),
            TransportEvent::Disconnected => {
                info!("Lost hub connection");
                self.joined = false;
                self.publish(SessionUpdate::Connection(self.connection.status()));
            }
            TransportEvent::Error(message) => {
                warn!(error = %message, "Hub connection error");
                self.publish(SessionUpdate::TransportError(message));
            }
            TransportEvent::Message { event, payload } => {
                match InboundEvent::parse(&event, payload) {
                    Ok(inbound) => self.on_inbound(inbound),
                    Err(e) => warn!(event = %event, error = %e, "Ignoring malformed hub event"),
                }
            }
        }
    }

    fn on_connected(&mut self) {
        self.publish(SessionUpdate::Connection(ConnectionStatus::Connected));
        if self.room_id.is_none() || self.joined {
            return;
        }
        // Reconnect: nothing seen before the gap can be trusted.
        info!(room = ?self.room_id, "Re-joining room after reconnect");
        if self.presence.clear() {
            self.publish_presence();
        }
        if self.editor.clear() {
            self.publish(SessionUpdate::EditorChanged(None));
        }
        self.send_join();
    }

    fn on_inbound(&mut self, event: InboundEvent) {
        if self.room_id.is_none() {
            if let InboundEvent::Error(message) = event {
                self.on_rejected(message);
            } else {
                debug!(?event, "Ignoring room event with no active room");
            }
            return;
        }

        match event {
            InboundEvent::WhiteboardUpdated {
                document,
                edited_by,
            } => {
                let changes =
                    self.document
                        .apply_remote_update(document, edited_by, &mut self.editor);
                self.publish_changes(changes);
            }
            InboundEvent::UserJoined(user) => {
                if self.presence.on_user_joined(user) {
                    self.publish_presence();
                }
            }
            InboundEvent::UserLeft(user) => {
                let left = self.presence.on_user_left(&user);
                let claim_cleared = self.editor.clear_if_user(&user.user_id);
                if left {
                    self.publish_presence();
                }
                if claim_cleared {
                    self.publish(SessionUpdate::EditorChanged(None));
                }
            }
            InboundEvent::ConnectedUsers(users) => {
                let before = self.presence.users();
                self.presence.replace_all(users);
                if self.presence.users() != before {
                    self.publish_presence();
                }
            }
            InboundEvent::CodeGenerated(code) => {
                info!(artifacts = code.components.len(), "Received generated code");
                self.generated_code = Some(code.clone());
                self.publish(SessionUpdate::CodeGenerated(code));
            }
            InboundEvent::Error(message) => self.on_rejected(message),
            InboundEvent::Unknown(name) => debug!(event = %name, "Unhandled hub event"),
        }
    }

    fn on_rejected(&mut self, message: String) {
        warn!(reason = %message, "Hub rejected request");
        self.publish(SessionUpdate::Rejected(message));
    }

    // -- Observers ----------------------------------------------------------

    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    fn publish(&self, update: SessionUpdate) {
        self.updates.publish(update);
    }

    fn publish_presence(&self) {
        self.publish(SessionUpdate::PresenceChanged(self.presence.users()));
    }

    fn publish_changes(&self, changes: Changes) {
        if changes.document {
            self.publish(SessionUpdate::DocumentChanged(self.document.document().clone()));
        }
        if changes.editor {
            self.publish(SessionUpdate::EditorChanged(self.editor.current().cloned()));
        }
    }

    // -- Getters ------------------------------------------------------------

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn document(&self) -> &Document {
        self.document.document()
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn users(&self) -> Vec<User> {
        self.presence.users()
    }

    pub fn editor(&self) -> Option<&EditorClaim> {
        self.editor.current()
    }

    pub fn generated_code(&self) -> Option<&GeneratedCode> {
        self.generated_code.as_ref()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    /// For registering raw event handlers.
    pub fn connection_mut(&mut self) -> &mut ConnectionManager<T> {
        &mut self.connection
    }
}
