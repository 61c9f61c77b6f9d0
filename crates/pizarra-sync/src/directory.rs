//! REST client for the room directory service.
//!
//! Rooms, invite codes, and stored whiteboard snapshots live behind a plain
//! request/response API; the sync core only consumes what it returns.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use pizarra_common::SyncError;

use crate::auth::AuthProvider;
use crate::document::Document;

/// A room as listed by the directory. Fields beyond `id` and `name` are
/// kept in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "room id must be a string or number, got {other}"
        ))),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InviteCodeResponse {
    invite_code: String,
}

/// The join endpoint answers with either the room or `{ "room": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum JoinResponse {
    Wrapped { room: RoomSummary },
    Bare(RoomSummary),
}

#[async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, SyncError>;
    async fn create_room(&self, name: &str) -> Result<RoomSummary, SyncError>;
    async fn invite_code(&self, room_id: &str) -> Result<String, SyncError>;
    async fn join_by_invite(&self, invite_code: &str) -> Result<RoomSummary, SyncError>;
    /// The stored document for a room, for `resync_from_room_snapshot`.
    async fn room_snapshot(&self, room_id: &str) -> Result<Document, SyncError>;
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

pub struct DirectoryClient {
    base_url: reqwest::Url,
    auth: Arc<dyn AuthProvider>,
    http: reqwest::Client,
}

impl DirectoryClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout_secs: u64,
        auth: Arc<dyn AuthProvider>,
    ) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;
        let base_url = base_url.into();
        let base_url = reqwest::Url::parse(&base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| SyncError::Network(format!("invalid directory URL: {base_url}")))?;
        Ok(Self {
            base_url,
            auth,
            http,
        })
    }

    /// Append `segments` to the base path, each percent-encoded as one segment.
    fn url(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn bearer(&self) -> Result<String, SyncError> {
        self.auth
            .token()
            .map(|t| format!("Bearer {t}"))
            .ok_or(SyncError::NotAuthenticated)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, SyncError> {
        let url = self.url(segments);
        debug!(path = %url.path(), "Directory GET");
        let response = self
            .http
            .get(url)
            .header("Authorization", self.bearer()?)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        read_json(response).await
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &serde_json::Value,
    ) -> Result<T, SyncError> {
        let url = self.url(segments);
        debug!(path = %url.path(), "Directory POST");
        let response = self
            .http
            .post(url)
            .header("Authorization", self.bearer()?)
            .json(body)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        read_json(response).await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, SyncError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(SyncError::Directory {
            status: status.as_u16(),
            message: error_message(&text, status),
        });
    }
    response
        .json()
        .await
        .map_err(|e| SyncError::Protocol(format!("bad directory response: {e}")))
}

/// Prefer the body's `message` field, fall back to a short excerpt.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .or_else(|| {
            let excerpt: String = body.trim().chars().take(200).collect();
            (!excerpt.is_empty()).then_some(excerpt)
        })
        .unwrap_or_else(|| status.to_string())
}

#[async_trait]
impl RoomDirectory for DirectoryClient {
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>, SyncError> {
        self.get(&["rooms"]).await
    }

    async fn create_room(&self, name: &str) -> Result<RoomSummary, SyncError> {
        self.post(&["rooms"], &serde_json::json!({ "name": name }))
            .await
    }

    async fn invite_code(&self, room_id: &str) -> Result<String, SyncError> {
        let response: InviteCodeResponse =
            self.get(&["rooms", room_id, "invite-code"]).await?;
        Ok(response.invite_code)
    }

    async fn join_by_invite(&self, invite_code: &str) -> Result<RoomSummary, SyncError> {
        let response: JoinResponse = self
            .post(
                &["rooms", "join"],
                &serde_json::json!({ "inviteCode": invite_code }),
            )
            .await?;
        Ok(match response {
            JoinResponse::Wrapped { room } | JoinResponse::Bare(room) => room,
        })
    }

    async fn room_snapshot(&self, room_id: &str) -> Result<Document, SyncError> {
        let snapshot: Option<Document> = self.get(&["rooms", room_id, "whiteboard"]).await?;
        let mut document = snapshot.unwrap_or_default();
        document.fill_missing_ids();
        Ok(document)
    }
}
