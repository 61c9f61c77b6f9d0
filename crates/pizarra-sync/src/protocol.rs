//! Application-level payloads exchanged with the whiteboard hub.
//!
//! These ride inside Socket.IO event frames; the framing itself is handled
//! by `connection::socket_io`. Field names are camelCase on the wire.

use serde::{Deserialize, Deserializer, Serialize};

use pizarra_common::SyncError;

use crate::document::Document;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// Socket.IO event names used by the hub.
pub mod events {
    // Outbound
    pub const JOIN_ROOM: &str = "joinRoom";
    pub const WHITEBOARD_UPDATE: &str = "whiteboardUpdate";
    pub const GENERATE_CODE: &str = "generateAngularCode";

    // Inbound
    pub const WHITEBOARD_UPDATED: &str = "whiteboardUpdated";
    pub const CODE_GENERATED: &str = "angularCodeGenerated";
    pub const USER_JOINED: &str = "userJoined";
    pub const USER_LEFT: &str = "userLeft";
    pub const CONNECTED_USERS: &str = "connectedUsers";
    pub const ERROR: &str = "error";
}

// ---------------------------------------------------------------------------
// Shared types
// ---------------------------------------------------------------------------

/// A user as reported by the auth service and by presence events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub username: String,
}

impl User {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

/// Advisory record of who is currently editing, and which component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorClaim {
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub component_id: Option<String>,
}

/// Output of the code generation service, kept verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeneratedCode {
    #[serde(default)]
    pub main: serde_json::Value,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub components: Vec<serde_json::Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Outbound payloads
// ---------------------------------------------------------------------------

/// `joinRoom` request.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload<'a> {
    pub room_id: &'a str,
    pub token: &'a str,
}

/// `whiteboardUpdate` request: always the full document.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteboardUpdatePayload<'a> {
    pub room_id: &'a str,
    pub components: &'a Document,
    pub edited_component_id: Option<&'a str>,
    pub token: &'a str,
}

/// `generateAngularCode` request.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeGenerationPayload<'a> {
    pub room_id: &'a str,
    pub token: &'a str,
}

// ---------------------------------------------------------------------------
// Inbound events
// ---------------------------------------------------------------------------

/// `whiteboardUpdated` broadcast.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteboardUpdatedPayload {
    #[serde(default)]
    pub components: Option<Document>,
    #[serde(default)]
    pub edited_by: Option<EditorClaim>,
}

/// A decoded hub event.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    WhiteboardUpdated {
        document: Document,
        edited_by: Option<EditorClaim>,
    },
    CodeGenerated(GeneratedCode),
    UserJoined(User),
    UserLeft(User),
    ConnectedUsers(Vec<User>),
    /// The hub refused a request (usually an expired or missing token).
    Error(String),
    Unknown(String),
}

impl InboundEvent {
    /// Decode a named hub event. Unknown names are not an error.
    pub fn parse(event: &str, payload: serde_json::Value) -> Result<Self, SyncError> {
        let parsed = match event {
            events::WHITEBOARD_UPDATED => {
                let p: WhiteboardUpdatedPayload = decode(event, payload)?;
                let mut document = p.components.unwrap_or_default();
                document.fill_missing_ids();
                InboundEvent::WhiteboardUpdated {
                    document,
                    edited_by: p.edited_by,
                }
            }
            events::CODE_GENERATED => InboundEvent::CodeGenerated(decode(event, payload)?),
            events::USER_JOINED => InboundEvent::UserJoined(decode(event, payload)?),
            events::USER_LEFT => InboundEvent::UserLeft(decode(event, payload)?),
            events::CONNECTED_USERS => {
                let users: Option<Vec<User>> = decode(event, payload)?;
                InboundEvent::ConnectedUsers(users.unwrap_or_default())
            }
            events::ERROR => InboundEvent::Error(error_message(&payload)),
            other => InboundEvent::Unknown(other.to_string()),
        };
        Ok(parsed)
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    event: &str,
    payload: serde_json::Value,
) -> Result<T, SyncError> {
    serde_json::from_value(payload)
        .map_err(|e| SyncError::Protocol(format!("malformed {event} payload: {e}")))
}

/// Hub errors arrive either as a bare string or as `{ "message": ... }`.
fn error_message(payload: &serde_json::Value) -> String {
    payload
        .as_str()
        .or_else(|| payload.get("message").and_then(|m| m.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| payload.to_string())
}
