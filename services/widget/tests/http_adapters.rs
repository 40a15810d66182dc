mod common;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use storefront_chat_core::{
    domain::Message,
    ports::{CatalogService, ConversationService, OrderLookupService, PortError},
};
use widget_lib::adapters::{
    http_client, HttpCatalogAdapter, HttpOrderLookupAdapter, PayloadMode,
    WebhookConversationAdapter,
};

fn transcript() -> Vec<Message> {
    vec![
        Message::assistant(1, "Hello!"),
        Message::user(2, "do you ship abroad?"),
    ]
}

#[tokio::test]
async fn webhook_posts_full_conversation() {
    let app = Router::new().route(
        "/hook",
        post(|Json(body): Json<Value>| async move {
            let conversation = body["conversation"].as_array().cloned().unwrap_or_default();
            let last = conversation
                .last()
                .and_then(|m| m["text"].as_str())
                .unwrap_or_default()
                .to_string();
            Json(json!({ "reply": format!("{} messages, last: {}", conversation.len(), last) }))
        }),
    );
    let base = common::serve(app).await;
    let adapter = WebhookConversationAdapter::new(
        common::client(),
        format!("{}/hook", base),
        PayloadMode::Conversation,
    );

    let reply = adapter.reply(&transcript()).await.unwrap();
    assert_eq!(reply.as_deref(), Some("2 messages, last: do you ship abroad?"));
}

#[tokio::test]
async fn webhook_minimal_payload_sends_latest_user_text() {
    let app = Router::new().route(
        "/hook",
        post(|Json(body): Json<Value>| async move {
            assert!(body.get("conversation").is_none());
            Json(json!({ "reply": body["message"] }))
        }),
    );
    let base = common::serve(app).await;
    let adapter = WebhookConversationAdapter::new(
        common::client(),
        format!("{}/hook", base),
        PayloadMode::LatestMessage,
    );

    let reply = adapter.reply(&transcript()).await.unwrap();
    assert_eq!(reply.as_deref(), Some("do you ship abroad?"));
}

#[tokio::test]
async fn webhook_server_error_is_a_status_error() {
    let app = Router::new().route("/hook", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let base = common::serve(app).await;
    let adapter = WebhookConversationAdapter::new(
        common::client(),
        format!("{}/hook", base),
        PayloadMode::Conversation,
    );

    assert!(matches!(
        adapter.reply(&transcript()).await,
        Err(PortError::Status(500))
    ));
}

#[tokio::test]
async fn webhook_without_reply_field_yields_none() {
    let app = Router::new().route("/hook", post(|| async { Json(json!({ "status": "ok" })) }));
    let base = common::serve(app).await;
    let adapter = WebhookConversationAdapter::new(
        common::client(),
        format!("{}/hook", base),
        PayloadMode::Conversation,
    );

    assert_eq!(adapter.reply(&transcript()).await.unwrap(), None);
}

#[tokio::test]
async fn webhook_connection_refused_is_unexpected() {
    let adapter = WebhookConversationAdapter::new(
        common::client(),
        format!("{}/hook", common::closed_port_url().await),
        PayloadMode::Conversation,
    );

    assert!(matches!(
        adapter.reply(&transcript()).await,
        Err(PortError::Unexpected(_))
    ));
}

#[tokio::test]
async fn webhook_slow_response_times_out() {
    let app = Router::new().route(
        "/hook",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Json(json!({ "reply": "too late" }))
        }),
    );
    let base = common::serve(app).await;
    let adapter = WebhookConversationAdapter::new(
        http_client(Duration::from_millis(300)).unwrap(),
        format!("{}/hook", base),
        PayloadMode::Conversation,
    );

    assert!(matches!(
        adapter.reply(&transcript()).await,
        Err(PortError::Timeout)
    ));
}

#[tokio::test]
async fn catalog_is_fetched_and_incomplete_items_skipped() {
    let app = Router::new().route(
        "/products",
        get(|| async {
            Json(json!([
                { "title": "Cast Iron Skillet", "price": 39.5, "stock": 8 },
                { "name": "Mystery Item" },
                { "name": "Chef Knife", "price": 89.99, "discount": "25% off" }
            ]))
        }),
    );
    let base = common::serve(app).await;
    let adapter = HttpCatalogAdapter::new(common::client(), format!("{}/products", base));

    let entries = adapter.fetch_catalog().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "Cast Iron Skillet");
    assert_eq!(entries[0].stock_count, Some(8));
    assert_eq!(entries[1].discount_label.as_deref(), Some("25% off"));
}

#[tokio::test]
async fn catalog_error_status_is_reported() {
    let app = Router::new().route("/products", get(|| async { StatusCode::BAD_GATEWAY }));
    let base = common::serve(app).await;
    let adapter = HttpCatalogAdapter::new(common::client(), format!("{}/products", base));

    assert!(matches!(
        adapter.fetch_catalog().await,
        Err(PortError::Status(502))
    ));
}

async fn order_handler(Path(id): Path<String>) -> impl IntoResponse {
    if id == "A1001" {
        (
            StatusCode::OK,
            Json(json!({
                "orderId": "A1001",
                "status": "out for delivery",
                "estimatedDelivery": "2026-10-20"
            })),
        )
            .into_response()
    } else if id == "E500" {
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

#[tokio::test]
async fn order_lookup_maps_found_missing_and_failing() {
    let app = Router::new().route("/orders/{id}", get(order_handler));
    let base = common::serve(app).await;
    let adapter = HttpOrderLookupAdapter::new(common::client(), format!("{}/orders/", base));

    let order = adapter.lookup_order("A1001").await.unwrap();
    assert_eq!(order.status, "out for delivery");
    assert_eq!(order.estimated_delivery.to_string(), "2026-10-20");

    assert!(matches!(
        adapter.lookup_order("Z9").await,
        Err(PortError::NotFound(ref id)) if id == "Z9"
    ));
    assert!(matches!(
        adapter.lookup_order("E500").await,
        Err(PortError::Status(500))
    ));
}
