//! crates/storefront_chat_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the chat widget's core logic.
//! These traits form the boundary of the hexagonal architecture, so the session
//! and the reply resolver never depend on a specific HTTP client or storage.

use crate::domain::{CatalogEntry, Intent, Message, OrderLookup};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (network, filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Remote endpoint answered with HTTP status {0}")]
    Status(u16),
    #[error("Malformed response body: {0}")]
    Malformed(String),
    #[error("The request timed out")]
    Timeout,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Forwards the transcript to the remote assistant.
    ///
    /// `Ok(None)` means the endpoint answered successfully but without a usable reply.
    async fn reply(&self, transcript: &[Message]) -> PortResult<Option<String>>;
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn fetch_catalog(&self) -> PortResult<Vec<CatalogEntry>>;
}

#[async_trait]
pub trait OrderLookupService: Send + Sync {
    /// Returns `PortError::NotFound` when the order does not exist.
    async fn lookup_order(&self, order_id: &str) -> PortResult<OrderLookup>;
}

#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Loads the transcript stored under `key`, if any.
    async fn load(&self, key: &str) -> PortResult<Option<Vec<Message>>>;

    /// Replaces whatever is stored under `key` with `messages`.
    async fn save(&self, key: &str, messages: &[Message]) -> PortResult<()>;
}

/// Decides how a user utterance should be answered.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Intent;
}
