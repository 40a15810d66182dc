//! crates/storefront_chat_core/src/domain.rs
//!
//! Defines the pure, core data structures for the chat widget.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use uuid::Uuid;

/// Who authored a message in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of the transcript. Never mutated once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: u64,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(id: u64, text: impl Into<String>) -> Self {
        Self::new(id, Role::User, text)
    }

    pub fn assistant(id: u64, text: impl Into<String>) -> Self {
        Self::new(id, Role::Assistant, text)
    }

    fn new(id: u64, role: Role, text: impl Into<String>) -> Self {
        Self {
            id,
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Identifies the client that owns a persisted transcript.
///
/// Passed explicitly into the session configuration; there is no global
/// fallback identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random identifier for clients that never stored one.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key under which this client's transcript is persisted.
    pub fn storage_key(&self) -> String {
        format!("chat_history_{}", self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A product as the catalog reports it. Read-only from the widget's side.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub price: f64,
    /// `None` when the catalog source does not report inventory.
    pub stock_count: Option<u32>,
    pub discount_label: Option<String>,
}

/// The result of looking up a single order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLookup {
    pub order_id: String,
    pub status: String,
    pub estimated_delivery: NaiveDate,
}

/// What the user appears to be asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ProductInquiry,
    OrderInquiry { order_id: Option<String> },
    Conversation,
}
