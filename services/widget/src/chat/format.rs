//! Fixed reply strings and the renderers for locally answered questions.

use storefront_chat_core::domain::{CatalogEntry, OrderLookup};

pub const GREETING: &str = "Hello! I'm your kitchen assistant. How can I help you today?";
pub const CONNECTIVITY_APOLOGY: &str = "⚠️ Couldn’t connect to assistant. Please try again later.";
pub const UNCLEAR_REPLY: &str = "Sorry, I didn’t understand that.";
pub const PRODUCT_CLARIFICATION: &str =
    "I couldn't find that product. Could you tell me the exact product name?";
pub const ORDER_ID_PROMPT: &str =
    "Please provide your order ID (for example, A12345) so I can look it up.";

const PRODUCT_SEPARATOR: &str = "\n";

/// `"<name>: $<price> - Stock: <count>[ - Discount: <label>]"`
pub fn catalog_entry(entry: &CatalogEntry) -> String {
    let stock = entry
        .stock_count
        .map(|count| count.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    let mut line = format!("{}: ${:.2} - Stock: {}", entry.name, entry.price, stock);
    if let Some(label) = &entry.discount_label {
        line.push_str(" - Discount: ");
        line.push_str(label);
    }
    line
}

pub fn catalog_matches(entries: &[CatalogEntry]) -> String {
    entries
        .iter()
        .map(catalog_entry)
        .collect::<Vec<_>>()
        .join(PRODUCT_SEPARATOR)
}

pub fn order_status(order: &OrderLookup) -> String {
    format!(
        "Order {} is currently {}. Estimated delivery: {}.",
        order.order_id,
        order.status,
        order.estimated_delivery.format("%Y-%m-%d")
    )
}

pub fn order_not_found(order_id: &str) -> String {
    format!(
        "Sorry, I couldn't find order {}. Please check the ID and try again.",
        order_id
    )
}
