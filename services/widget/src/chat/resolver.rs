//! services/widget/src/chat/resolver.rs
//!
//! Turns a transcript into the next assistant reply. Local answers come from
//! the catalog and order lookup ports; everything else is delegated to the
//! conversational webhook. Resolution never fails: every external error
//! degrades to a fixed fallback string.

use crate::chat::format;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storefront_chat_core::{
    domain::{Intent, Message},
    ports::{
        CatalogService, ConversationService, IntentClassifier, OrderLookupService, PortError,
        PortResult,
    },
};
use tracing::{error, info, warn};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Produces assistant replies for a session.
#[derive(Clone)]
pub struct ReplyResolver {
    classifier: Arc<dyn IntentClassifier>,
    catalog: Arc<dyn CatalogService>,
    orders: Arc<dyn OrderLookupService>,
    conversation: Arc<dyn ConversationService>,
    request_timeout: Duration,
}

impl ReplyResolver {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        catalog: Arc<dyn CatalogService>,
        orders: Arc<dyn OrderLookupService>,
        conversation: Arc<dyn ConversationService>,
    ) -> Self {
        Self {
            classifier,
            catalog,
            orders,
            conversation,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bounds every outbound call made while resolving a reply.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Resolves the reply to the newest user message in `transcript`.
    pub async fn resolve(&self, transcript: &[Message]) -> String {
        let start_time = Instant::now();
        let latest = transcript
            .iter()
            .rev()
            .find(|m| m.is_user())
            .map(|m| m.text.as_str())
            .unwrap_or_default();

        let intent = self.classifier.classify(latest);
        info!("Resolving reply for intent {:?}", intent);

        let reply = match intent {
            Intent::ProductInquiry => self.answer_product(latest).await,
            Intent::OrderInquiry { order_id } => self.answer_order(order_id).await,
            Intent::Conversation => self.answer_conversation(transcript).await,
        };
        info!("⏱️ Reply resolved in {:?}", start_time.elapsed());
        reply
    }

    async fn answer_product(&self, text: &str) -> String {
        let catalog = match self.bounded(self.catalog.fetch_catalog()).await {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Catalog fetch failed: {}", e);
                return format::CONNECTIVITY_APOLOGY.to_string();
            }
        };

        let lowered = text.to_lowercase();
        let matches: Vec<_> = catalog
            .into_iter()
            .filter(|entry| lowered.contains(&entry.name.to_lowercase()))
            .collect();

        if matches.is_empty() {
            format::PRODUCT_CLARIFICATION.to_string()
        } else {
            format::catalog_matches(&matches)
        }
    }

    async fn answer_order(&self, order_id: Option<String>) -> String {
        let Some(order_id) = order_id else {
            return format::ORDER_ID_PROMPT.to_string();
        };

        match self.bounded(self.orders.lookup_order(&order_id)).await {
            Ok(order) => format::order_status(&order),
            Err(PortError::NotFound(_)) => {
                info!("Order {} not found", order_id);
                format::order_not_found(&order_id)
            }
            Err(e) => {
                warn!("Order lookup for {} failed: {}", order_id, e);
                format::order_not_found(&order_id)
            }
        }
    }

    async fn answer_conversation(&self, transcript: &[Message]) -> String {
        match self.bounded(self.conversation.reply(transcript)).await {
            Ok(Some(reply)) => reply,
            Ok(None) => format::UNCLEAR_REPLY.to_string(),
            Err(e) => {
                error!("Chatbot error: {}", e);
                format::CONNECTIVITY_APOLOGY.to_string()
            }
        }
    }

    async fn bounded<T>(&self, call: impl Future<Output = PortResult<T>>) -> PortResult<T> {
        tokio::time::timeout(self.request_timeout, call)
            .await
            .unwrap_or(Err(PortError::Timeout))
    }
}
