//! Optimistic local edits and wholesale remote replacement.
//!
//! Every local edit replaces the document immediately and then retransmits
//! the *whole* document; every inbound update replaces it again. Whichever
//! snapshot arrives last wins.

use tracing::{debug, warn};

use pizarra_common::new_component_id;

use crate::auth::AuthProvider;
use crate::connection::Emitter;
use crate::editor::EditorArbitrator;
use crate::protocol::{events, EditorClaim, WhiteboardUpdatePayload};

use super::types::{Component, ComponentId, Document, Properties};

/// Everything a local edit touches outside the document itself.
pub struct EditContext<'a> {
    /// Room to publish into; `None` keeps the edit local.
    pub room_id: Option<&'a str>,
    pub auth: &'a dyn AuthProvider,
    pub editor: &'a mut EditorArbitrator,
    pub outbox: &'a mut dyn Emitter,
}

/// Which observable values an operation changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub document: bool,
    pub editor: bool,
}

impl Changes {
    pub fn any(&self) -> bool {
        self.document || self.editor
    }
}

#[derive(Debug, Default)]
pub struct DocumentSynchronizer {
    document: Document,
}

impl DocumentSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Replace the document with `mutator(current)`, claim the editor role
    /// for the local user, then send the full result to the hub.
    ///
    /// Never fails: with no room, no token, or no connection the edit stays
    /// local and the emit is dropped.
    pub fn apply_local_edit<F>(
        &mut self,
        ctx: EditContext<'_>,
        touched: Option<ComponentId>,
        mutator: F,
    ) -> Changes
    where
        F: FnOnce(&Document) -> Document,
    {
        let next = mutator(&self.document);
        let mut changes = Changes {
            document: next != self.document,
            editor: false,
        };
        self.document = next;

        match ctx.auth.user() {
            Some(user) => {
                changes.editor = ctx
                    .editor
                    .claim(user.user_id, user.username, touched.clone());
            }
            None => warn!("Local edit without a known user; editor claim unchanged"),
        }

        self.publish(ctx.room_id, ctx.auth, ctx.outbox, touched.as_deref());
        changes
    }

    /// Add a component under a freshly generated id.
    pub fn add_component(
        &mut self,
        ctx: EditContext<'_>,
        properties: Properties,
    ) -> (ComponentId, Changes) {
        let id = new_component_id();
        let component = Component::with_id(id.clone(), properties);
        let changes = self.apply_local_edit(ctx, Some(id.clone()), move |doc| {
            let mut next = doc.clone();
            next.insert(component);
            next
        });
        (id, changes)
    }

    /// Shallow-merge `patch` into an existing component. Absent ids are a no-op.
    pub fn update_component(
        &mut self,
        ctx: EditContext<'_>,
        id: &str,
        patch: &Properties,
    ) -> Changes {
        if !self.document.contains(id) {
            debug!(component = %id, "Ignoring update of unknown component");
            return Changes::default();
        }
        self.apply_local_edit(ctx, Some(id.to_string()), |doc| {
            let mut next = doc.clone();
            if let Some(component) = next.get_mut(id) {
                component.merge(patch);
            }
            next
        })
    }

    /// Delete a component. Absent ids are a no-op.
    ///
    /// A claim naming the removed component is left as is.
    pub fn remove_component(&mut self, ctx: EditContext<'_>, id: &str) -> Changes {
        if !self.document.contains(id) {
            debug!(component = %id, "Ignoring removal of unknown component");
            return Changes::default();
        }
        self.apply_local_edit(ctx, None, |doc| {
            let mut next = doc.clone();
            next.remove(id);
            next
        })
    }

    /// Take the hub's snapshot wholesale, including who it says is editing.
    /// Applying the same snapshot twice changes nothing the second time.
    pub fn apply_remote_update(
        &mut self,
        document: Document,
        edited_by: Option<EditorClaim>,
        editor: &mut EditorArbitrator,
    ) -> Changes {
        let changes = Changes {
            document: self.replace(document),
            editor: editor.set(edited_by),
        };
        debug!(
            components = self.document.len(),
            document_changed = changes.document,
            "Applied remote whiteboard update"
        );
        changes
    }

    /// Seed from an authoritative snapshot after a join. Replaces, never merges.
    pub fn resync_from_room_snapshot(&mut self, document: Document) -> bool {
        self.replace(document)
    }

    pub fn reset(&mut self) -> bool {
        self.replace(Document::new())
    }

    fn replace(&mut self, document: Document) -> bool {
        if self.document == document {
            return false;
        }
        self.document = document;
        true
    }

    fn publish(
        &self,
        room_id: Option<&str>,
        auth: &dyn AuthProvider,
        outbox: &mut dyn Emitter,
        edited_component_id: Option<&str>,
    ) {
        let Some(room_id) = room_id else {
            debug!("No active room; keeping edit local");
            return;
        };
        let Some(token) = auth.token() else {
            warn!(room = %room_id, "No auth token; keeping edit local");
            return;
        };
        let payload = WhiteboardUpdatePayload {
            room_id,
            components: &self.document,
            edited_component_id,
            token: &token,
        };
        match serde_json::to_value(&payload) {
            Ok(value) => {
                outbox.emit(events::WHITEBOARD_UPDATE, value);
            }
            Err(e) => warn!(error = %e, "Failed to encode whiteboard update"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::auth::Credentials;
    use crate::protocol::User;

    #[derive(Default)]
    struct Outbox {
        connected: bool,
        sent: Vec<(String, serde_json::Value)>,
    }

    impl Emitter for Outbox {
        fn emit(&mut self, event: &str, payload: serde_json::Value) -> bool {
            if !self.connected {
                return false;
            }
            self.sent.push((event.to_string(), payload));
            true
        }
    }

    struct Harness {
        sync: DocumentSynchronizer,
        editor: EditorArbitrator,
        outbox: Outbox,
        auth: Credentials,
        room: Option<String>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                sync: DocumentSynchronizer::new(),
                editor: EditorArbitrator::new(),
                outbox: Outbox {
                    connected: true,
                    ..Default::default()
                },
                auth: Credentials::new(User::new("u1", "ana"), "tok"),
                room: Some("R1".into()),
            }
        }

        fn ctx(&mut self) -> (&mut DocumentSynchronizer, EditContext<'_>) {
            (
                &mut self.sync,
                EditContext {
                    room_id: self.room.as_deref(),
                    auth: &self.auth,
                    editor: &mut self.editor,
                    outbox: &mut self.outbox,
                },
            )
        }

        fn add(&mut self, value: serde_json::Value) -> ComponentId {
            let (sync, ctx) = self.ctx();
            sync.add_component(ctx, props(value)).0
        }

        fn update(&mut self, id: &str, value: serde_json::Value) -> Changes {
            let (sync, ctx) = self.ctx();
            sync.update_component(ctx, id, &props(value))
        }

        fn remove(&mut self, id: &str) -> Changes {
            let (sync, ctx) = self.ctx();
            sync.remove_component(ctx, id)
        }
    }

    fn props(value: serde_json::Value) -> Properties {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn add_is_visible_immediately_and_emits_full_document() {
        let mut h = Harness::new();
        let id = h.add(json!({"type": "note", "text": "hi"}));

        assert!(id.starts_with("component-"));
        let doc = h.sync.document();
        assert_eq!(doc.len(), 1);
        assert_eq!(
            doc.get(&id).unwrap().properties,
            props(json!({"type": "note", "text": "hi"}))
        );

        assert_eq!(h.outbox.sent.len(), 1);
        let (event, payload) = &h.outbox.sent[0];
        assert_eq!(event, events::WHITEBOARD_UPDATE);
        assert_eq!(payload["roomId"], "R1");
        assert_eq!(payload["token"], "tok");
        assert_eq!(payload["editedComponentId"], json!(id));
        assert_eq!(payload["components"][&id]["text"], "hi");
    }

    #[test]
    fn added_ids_are_unique() {
        let mut h = Harness::new();
        let a = h.add(json!({}));
        let b = h.add(json!({}));
        assert_ne!(a, b);
        assert_eq!(h.sync.document().len(), 2);
    }

    #[test]
    fn local_edit_claims_editor_for_touched_component() {
        let mut h = Harness::new();
        let id = h.add(json!({"x": 1}));
        let claim = h.editor.current().unwrap();
        assert_eq!(claim.user_id, "u1");
        assert_eq!(claim.username, "ana");
        assert_eq!(claim.component_id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn update_merges_shallowly() {
        let mut h = Harness::new();
        let id = h.add(json!({"x": 1, "y": 2}));
        let changes = h.update(&id, json!({"x": 10}));

        assert!(changes.document);
        let c = h.sync.document().get(&id).unwrap();
        assert_eq!(c.get("x"), Some(&json!(10)));
        assert_eq!(c.get("y"), Some(&json!(2)));
        assert_eq!(h.outbox.sent.len(), 2);
    }

    #[test]
    fn update_and_remove_of_missing_id_are_noops() {
        let mut h = Harness::new();
        h.add(json!({"x": 1}));
        let before = h.sync.document().clone();
        h.outbox.sent.clear();

        assert_eq!(h.update("missing", json!({"x": 2})), Changes::default());
        assert_eq!(h.remove("missing"), Changes::default());

        assert_eq!(h.sync.document(), &before);
        assert!(h.outbox.sent.is_empty());
    }

    #[test]
    fn remove_sends_null_component_and_leaves_claim_dangling() {
        let mut h = Harness::new();
        let id = h.add(json!({}));
        h.remove(&id);

        assert!(h.sync.document().is_empty());
        let (_, payload) = h.outbox.sent.last().unwrap();
        assert_eq!(payload["editedComponentId"], serde_json::Value::Null);
        // The claim is not validated against the document.
        let claim = h.editor.current().unwrap();
        assert_eq!(claim.component_id, None);
    }

    #[test]
    fn edit_without_room_stays_local() {
        let mut h = Harness::new();
        h.room = None;
        let id = h.add(json!({"x": 1}));
        assert!(h.sync.document().contains(&id));
        assert!(h.outbox.sent.is_empty());
    }

    #[test]
    fn edit_while_disconnected_does_not_fail() {
        let mut h = Harness::new();
        h.outbox.connected = false;
        let id = h.add(json!({"x": 1}));
        assert!(h.sync.document().contains(&id));
        assert!(h.outbox.sent.is_empty());
    }

    #[test]
    fn edit_without_token_stays_local() {
        let mut h = Harness::new();
        h.auth = Credentials::new(User::new("u1", "ana"), "");
        h.add(json!({}));
        assert!(h.outbox.sent.is_empty());
        assert!(h.editor.is_held_by("u1"));
    }

    struct TokenOnly;

    impl AuthProvider for TokenOnly {
        fn token(&self) -> Option<String> {
            Some("tok".into())
        }

        fn user(&self) -> Option<User> {
            None
        }
    }

    #[test]
    fn edit_without_user_keeps_claim_but_still_emits() {
        let mut sync = DocumentSynchronizer::new();
        let mut editor = EditorArbitrator::new();
        let mut outbox = Outbox {
            connected: true,
            ..Default::default()
        };
        editor.claim("u2", "bob", None);

        let ctx = EditContext {
            room_id: Some("R1"),
            auth: &TokenOnly,
            editor: &mut editor,
            outbox: &mut outbox,
        };
        let (id, changes) = sync.add_component(ctx, Properties::new());

        assert!(changes.document);
        assert!(!changes.editor);
        assert!(sync.document().contains(&id));
        assert!(editor.is_held_by("u2"));
        assert_eq!(outbox.sent.len(), 1);
    }

    #[test]
    fn remote_update_replaces_wholesale() {
        let mut h = Harness::new();
        let c1 = Component::with_id("c1", props(json!({"x": 1})));
        h.sync
            .resync_from_room_snapshot([c1].into_iter().collect());
        h.update("c1", json!({"x": 10}));

        let remote: Document = [Component::with_id("c1", props(json!({"x": 5})))]
            .into_iter()
            .collect();
        let changes = h.sync.apply_remote_update(remote, None, &mut h.editor);

        assert!(changes.document);
        assert!(changes.editor);
        assert_eq!(
            h.sync.document().get("c1").unwrap().get("x"),
            Some(&json!(5))
        );
        assert!(h.editor.current().is_none());
    }

    #[test]
    fn remote_update_is_idempotent() {
        let mut h = Harness::new();
        let doc: Document = [Component::with_id("a", props(json!({"n": 1})))]
            .into_iter()
            .collect();
        let claim = EditorClaim {
            user_id: "u2".into(),
            username: "bob".into(),
            component_id: Some("a".into()),
        };

        let first = h
            .sync
            .apply_remote_update(doc.clone(), Some(claim.clone()), &mut h.editor);
        assert!(first.any());

        let second = h
            .sync
            .apply_remote_update(doc.clone(), Some(claim.clone()), &mut h.editor);
        assert!(!second.any());
        assert_eq!(h.sync.document(), &doc);
        assert_eq!(h.editor.current(), Some(&claim));
    }

    #[test]
    fn echo_of_own_edit_changes_nothing() {
        let mut h = Harness::new();
        let id = h.add(json!({"x": 1}));
        let echoed = h.sync.document().clone();
        let own_claim = h.editor.current().cloned();

        let changes = h.sync.apply_remote_update(echoed, own_claim, &mut h.editor);
        assert!(!changes.any());
        assert!(h.sync.document().contains(&id));
    }

    #[test]
    fn resync_and_reset_replace() {
        let mut h = Harness::new();
        h.add(json!({}));
        let snapshot: Document = [Component::with_id("s", Properties::new())]
            .into_iter()
            .collect();
        assert!(h.sync.resync_from_room_snapshot(snapshot.clone()));
        assert_eq!(h.sync.document(), &snapshot);
        assert!(!h.sync.resync_from_room_snapshot(snapshot));

        assert!(h.sync.reset());
        assert!(h.sync.document().is_empty());
        assert!(!h.sync.reset());
    }
}
