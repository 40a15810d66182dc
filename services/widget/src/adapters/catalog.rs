//! services/widget/src/adapters/catalog.rs
//!
//! Adapters implementing the `CatalogService` port: one backed by a remote JSON
//! endpoint and one serving the storefront's featured products from memory.

use super::map_transport_error;
use async_trait::async_trait;
use serde_json::Value;
use storefront_chat_core::{
    domain::CatalogEntry,
    ports::{CatalogService, PortError, PortResult},
};
use tracing::warn;

//=========================================================================================
// Remote Catalog
//=========================================================================================

/// An adapter that fetches the catalog with `GET <url>`.
#[derive(Clone)]
pub struct HttpCatalogAdapter {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogAdapter {
    /// Creates a new `HttpCatalogAdapter`.
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl CatalogService for HttpCatalogAdapter {
    async fn fetch_catalog(&self) -> PortResult<Vec<CatalogEntry>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Status(status.as_u16()));
        }
        let body = response.text().await.map_err(map_transport_error)?;
        parse_catalog(&body)
    }
}

/// Parses a catalog response body.
///
/// The body must be a JSON array. Entries without a name (or `title`) or without
/// a numeric price are skipped rather than failing the whole catalog.
pub fn parse_catalog(body: &str) -> PortResult<Vec<CatalogEntry>> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| PortError::Malformed(e.to_string()))?;
    let items = value
        .as_array()
        .ok_or_else(|| PortError::Malformed("catalog body is not a JSON array".to_string()))?;

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match parse_entry(item) {
            Some(entry) => entries.push(entry),
            None => warn!("Skipping catalog item {} with missing name or price", index),
        }
    }
    Ok(entries)
}

fn parse_entry(item: &Value) -> Option<CatalogEntry> {
    let name = item
        .get("name")
        .or_else(|| item.get("title"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())?
        .to_string();

    let price = match item.get("price")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !price.is_finite() {
        return None;
    }

    let stock_count = item
        .get("stock")
        .and_then(Value::as_u64)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX));

    let discount_label = match item.get("discount") {
        Some(Value::String(label)) if !label.trim().is_empty() => Some(label.trim().to_string()),
        Some(Value::Number(n)) => n.as_f64().map(|pct| format!("{}% off", pct)),
        _ => None,
    };

    Some(CatalogEntry {
        name,
        price,
        stock_count,
        discount_label,
    })
}

//=========================================================================================
// Static Catalog
//=========================================================================================

/// Serves a fixed, in-memory catalog.
#[derive(Clone, Debug)]
pub struct StaticCatalogAdapter {
    entries: Vec<CatalogEntry>,
}

impl StaticCatalogAdapter {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The storefront's featured products with their demo inventory.
    pub fn featured() -> Self {
        let entry = |name: &str, price: f64, stock: u32, discount: Option<&str>| CatalogEntry {
            name: name.to_string(),
            price,
            stock_count: Some(stock),
            discount_label: discount.map(str::to_string),
        };
        Self::new(vec![
            entry("Professional Chef Knife Set", 89.99, 24, Some("25% off")),
            entry("Copper Cookware Collection", 149.99, 12, Some("25% off")),
            entry("Bamboo Cutting Board Set", 45.99, 0, Some("23% off")),
            entry("Silicone Utensil Collection", 29.99, 40, None),
        ])
    }
}

#[async_trait]
impl CatalogService for StaticCatalogAdapter {
    async fn fetch_catalog(&self) -> PortResult<Vec<CatalogEntry>> {
        Ok(self.entries.clone())
    }
}
