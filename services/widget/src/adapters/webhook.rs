//! services/widget/src/adapters/webhook.rs
//!
//! This module contains the adapter for the remote conversational webhook.
//! It implements the `ConversationService` port from the `core` crate.

use super::map_transport_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;
use storefront_chat_core::{
    domain::Message,
    ports::{ConversationService, PortError, PortResult},
};
use tracing::debug;

/// Which request body the webhook expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    /// `{ "conversation": [...] }` with the whole transcript.
    Conversation,
    /// `{ "message": "..." }` with only the newest user utterance.
    LatestMessage,
}

impl FromStr for PayloadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conversation" => Ok(PayloadMode::Conversation),
            "message" => Ok(PayloadMode::LatestMessage),
            other => Err(other.to_string()),
        }
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage<'a> {
    id: u64,
    role: &'static str,
    text: &'a str,
    created_at: DateTime<Utc>,
}

impl<'a> From<&'a Message> for WireMessage<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            id: message.id,
            role: message.role.as_str(),
            text: &message.text,
            created_at: message.created_at,
        }
    }
}

#[derive(Serialize)]
struct ConversationRequest<'a> {
    conversation: Vec<WireMessage<'a>>,
}

#[derive(Serialize)]
struct LatestMessageRequest<'a> {
    message: &'a str,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ConversationService` by POSTing to a webhook.
#[derive(Clone)]
pub struct WebhookConversationAdapter {
    client: reqwest::Client,
    url: String,
    mode: PayloadMode,
}

impl WebhookConversationAdapter {
    /// Creates a new `WebhookConversationAdapter`.
    pub fn new(client: reqwest::Client, url: String, mode: PayloadMode) -> Self {
        Self { client, url, mode }
    }

    async fn post<B: Serialize + ?Sized>(&self, body: &B) -> PortResult<String> {
        let response = self
            .client
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Status(status.as_u16()));
        }
        response.text().await.map_err(map_transport_error)
    }
}

/// Extracts the `reply` field from a webhook response body.
///
/// The body must be JSON; a missing, non-string or blank `reply` yields `None`.
pub fn parse_reply_body(body: &str) -> PortResult<Option<String>> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| PortError::Malformed(e.to_string()))?;
    Ok(value
        .get("reply")
        .and_then(Value::as_str)
        .filter(|reply| !reply.trim().is_empty())
        .map(str::to_string))
}

//=========================================================================================
// `ConversationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ConversationService for WebhookConversationAdapter {
    async fn reply(&self, transcript: &[Message]) -> PortResult<Option<String>> {
        debug!(
            "Forwarding {} messages to webhook in {:?} mode",
            transcript.len(),
            self.mode
        );
        let body = match self.mode {
            PayloadMode::Conversation => {
                let request = ConversationRequest {
                    conversation: transcript.iter().map(WireMessage::from).collect(),
                };
                self.post(&request).await?
            }
            PayloadMode::LatestMessage => {
                let latest = transcript
                    .iter()
                    .rev()
                    .find(|m| m.is_user())
                    .map(|m| m.text.as_str())
                    .unwrap_or_default();
                self.post(&LatestMessageRequest { message: latest }).await?
            }
        };
        parse_reply_body(&body)
    }
}
