//! services/widget/src/adapters/store.rs
//!
//! Adapters implementing the `TranscriptStore` port. Both keep the transcript as
//! a JSON array of `{ id, text, role, timestamp }` records under a string key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use storefront_chat_core::{
    domain::{Message, Role},
    ports::{PortError, PortResult, TranscriptStore},
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

//=========================================================================================
// Persisted Record Structs
//=========================================================================================

#[derive(Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum RoleRecord {
    User,
    Assistant,
}

/// One persisted message. Older records carry `isBot` instead of `role`.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageRecord {
    id: u64,
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<RoleRecord>,
    #[serde(default, skip_serializing)]
    is_bot: Option<bool>,
    timestamp: DateTime<Utc>,
}

impl MessageRecord {
    fn from_domain(message: &Message) -> Self {
        let role = match message.role {
            Role::User => RoleRecord::User,
            Role::Assistant => RoleRecord::Assistant,
        };
        Self {
            id: message.id,
            text: message.text.clone(),
            role: Some(role),
            is_bot: None,
            timestamp: message.created_at,
        }
    }

    fn to_domain(self) -> Option<Message> {
        let role = match (self.role, self.is_bot) {
            (Some(RoleRecord::User), _) | (None, Some(false)) => Role::User,
            (Some(RoleRecord::Assistant), _) | (None, Some(true)) => Role::Assistant,
            (None, None) => return None,
        };
        Some(Message {
            id: self.id,
            role,
            text: self.text,
            created_at: self.timestamp,
        })
    }
}

/// Serializes messages into the persisted JSON form.
pub fn encode_transcript(messages: &[Message]) -> PortResult<String> {
    let records: Vec<MessageRecord> = messages.iter().map(MessageRecord::from_domain).collect();
    serde_json::to_string(&records).map_err(|e| PortError::Unexpected(e.to_string()))
}

/// Restores messages from their persisted JSON form, keeping stored order.
///
/// Records that carry neither `role` nor `isBot` are dropped.
pub fn decode_transcript(body: &str) -> PortResult<Vec<Message>> {
    let records: Vec<MessageRecord> =
        serde_json::from_str(body).map_err(|e| PortError::Malformed(e.to_string()))?;
    let total = records.len();
    let messages: Vec<Message> = records
        .into_iter()
        .filter_map(MessageRecord::to_domain)
        .collect();
    if messages.len() != total {
        warn!(
            "Dropped {} persisted messages without a role",
            total - messages.len()
        );
    }
    Ok(messages)
}

//=========================================================================================
// File-backed Store
//=========================================================================================

/// Stores each transcript as `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileTranscriptStore {
    dir: PathBuf,
}

impl FileTranscriptStore {
    /// Creates a new `FileTranscriptStore`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Percent-encodes the key, so distinct keys always get distinct files and
    /// none can leave `dir`.
    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn load(&self, key: &str) -> PortResult<Option<Vec<Message>>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => decode_transcript(&body).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No persisted transcript at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(PortError::Unexpected(e.to_string())),
        }
    }

    async fn save(&self, key: &str, messages: &[Message]) -> PortResult<()> {
        let body = encode_transcript(messages)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Write then rename so a crash never leaves a half-written transcript.
        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, body)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}

//=========================================================================================
// In-memory Store
//=========================================================================================

/// Keeps encoded transcripts in a map, the same shape a browser's local storage has.
#[derive(Debug, Default)]
pub struct InMemoryTranscriptStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the encoded JSON stored under `key`.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Stores an already-encoded body under `key`.
    pub async fn put_raw(&self, key: &str, body: impl Into<String>) {
        self.entries.lock().await.insert(key.to_string(), body.into());
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscriptStore {
    async fn load(&self, key: &str) -> PortResult<Option<Vec<Message>>> {
        match self.raw(key).await {
            Some(body) => decode_transcript(&body).map(Some),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, messages: &[Message]) -> PortResult<()> {
        let body = encode_transcript(messages)?;
        self.put_raw(key, body).await;
        Ok(())
    }
}
