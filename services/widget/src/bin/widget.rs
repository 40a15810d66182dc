//! services/widget/src/bin/widget.rs
//!
//! A headless host for one chat session: reads lines from stdin and prints the
//! transcript as it grows.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use storefront_chat_core::ports::{
    CatalogService, ConversationService, OrderLookupService, TranscriptStore,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use widget_lib::{
    adapters::{
        http_client, FileTranscriptStore, HttpCatalogAdapter, HttpOrderLookupAdapter,
        StaticCatalogAdapter, StubOrderLookupAdapter, WebhookConversationAdapter,
    },
    chat::{ChatSession, KeywordIntentClassifier, ReplyResolver, SessionView, SubmitOutcome},
    config::Config,
    error::WidgetError,
};

#[tokio::main]
async fn main() -> Result<(), WidgetError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded for client {}", config.client_id);

    // --- 2. Initialize Service Adapters ---
    let client = http_client(config.request_timeout)?;

    let conversation: Arc<dyn ConversationService> = Arc::new(WebhookConversationAdapter::new(
        client.clone(),
        config.webhook_url.clone(),
        config.payload_mode,
    ));
    let catalog: Arc<dyn CatalogService> = match &config.catalog_url {
        Some(url) => Arc::new(HttpCatalogAdapter::new(client.clone(), url.clone())),
        None => {
            info!("No CATALOG_URL set; using the featured product catalog.");
            Arc::new(StaticCatalogAdapter::featured())
        }
    };
    let orders: Arc<dyn OrderLookupService> = match &config.order_lookup_url {
        Some(url) => Arc::new(HttpOrderLookupAdapter::new(client.clone(), url.clone())),
        None => {
            info!("No ORDER_LOOKUP_URL set; using demo orders.");
            Arc::new(StubOrderLookupAdapter::demo())
        }
    };

    let resolver = ReplyResolver::new(
        Arc::new(KeywordIntentClassifier::default()),
        catalog,
        orders,
        conversation,
    )
    .with_request_timeout(config.request_timeout);

    // --- 3. Build the Session ---
    let session = match &config.transcript_dir {
        Some(dir) => {
            info!("Persisting transcripts under {}", dir.display());
            let store: Arc<dyn TranscriptStore> = Arc::new(FileTranscriptStore::new(dir.clone()));
            ChatSession::restore(config.session_config(), resolver, store).await
        }
        None => ChatSession::new(config.session_config(), resolver),
    };

    let printed = Arc::new(AtomicU64::new(0));
    {
        let printed = printed.clone();
        session
            .subscribe(move |view| print_new_messages(view, &printed))
            .await;
    }
    let snapshot = session.snapshot().await;
    print_new_messages(
        &SessionView {
            messages: &snapshot.messages,
            is_open: snapshot.is_open,
            is_composing: snapshot.is_composing,
            draft: &snapshot.draft,
        },
        &printed,
    );

    // --- 4. Input Loop ---
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/toggle" => {
                let open = session.toggle_visibility().await;
                println!("[widget {}]", if open { "opened" } else { "closed" });
            }
            _ => {
                session.update_draft(line.as_str()).await;
                match session.submit_draft().await {
                    SubmitOutcome::Sent(pending) => pending.wait().await,
                    SubmitOutcome::Busy => println!("[still waiting for the last reply]"),
                    SubmitOutcome::Ignored | SubmitOutcome::Closed => {}
                }
            }
        }
    }

    session.shutdown();
    info!("Session closed.");
    Ok(())
}

/// Prints every message newer than the last one printed.
fn print_new_messages(view: &SessionView<'_>, printed: &AtomicU64) {
    let last = printed.load(Ordering::SeqCst);
    for message in view.messages.iter().filter(|m| m.id > last) {
        println!("{:>9}: {}", message.role.as_str(), message.text);
        printed.fetch_max(message.id, Ordering::SeqCst);
    }
}
