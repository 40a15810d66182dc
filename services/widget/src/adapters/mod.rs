pub mod catalog;
pub mod orders;
pub mod store;
pub mod webhook;

pub use catalog::{HttpCatalogAdapter, StaticCatalogAdapter};
pub use orders::{HttpOrderLookupAdapter, StubOrderLookupAdapter};
pub use store::{FileTranscriptStore, InMemoryTranscriptStore};
pub use webhook::{PayloadMode, WebhookConversationAdapter};

use std::time::Duration;

const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Builds the HTTP client shared by every outbound adapter.
///
/// `timeout` bounds the whole request so a hanging endpoint cannot keep the
/// widget composing forever.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
        .build()
}

/// Maps a transport-level failure onto the port error taxonomy.
pub(crate) fn map_transport_error(e: reqwest::Error) -> storefront_chat_core::PortError {
    if e.is_timeout() {
        storefront_chat_core::PortError::Timeout
    } else {
        storefront_chat_core::PortError::Unexpected(e.to_string())
    }
}
