//! services/widget/src/adapters/orders.rs
//!
//! Adapters implementing the `OrderLookupService` port.

use super::map_transport_error;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use storefront_chat_core::{
    domain::OrderLookup,
    ports::{OrderLookupService, PortError, PortResult},
};

//=========================================================================================
// Remote Order Lookup
//=========================================================================================

/// An adapter that looks orders up with `GET <base_url>/<order_id>`.
#[derive(Clone)]
pub struct HttpOrderLookupAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrderLookupAdapter {
    /// Creates a new `HttpOrderLookupAdapter`.
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { client, base_url }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderRecord {
    order_id: String,
    status: String,
    estimated_delivery: String,
}

impl OrderRecord {
    fn to_domain(self) -> PortResult<OrderLookup> {
        let estimated_delivery = parse_delivery_date(&self.estimated_delivery)?;
        Ok(OrderLookup {
            order_id: self.order_id,
            status: self.status,
            estimated_delivery,
        })
    }
}

/// Accepts either a plain `YYYY-MM-DD` date or an RFC 3339 timestamp.
fn parse_delivery_date(raw: &str) -> PortResult<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| PortError::Malformed(format!("invalid estimatedDelivery '{}'", raw)))
}

/// Parses an order lookup response body.
pub fn parse_order(body: &str) -> PortResult<OrderLookup> {
    serde_json::from_str::<OrderRecord>(body)
        .map_err(|e| PortError::Malformed(e.to_string()))?
        .to_domain()
}

#[async_trait]
impl OrderLookupService for HttpOrderLookupAdapter {
    async fn lookup_order(&self, order_id: &str) -> PortResult<OrderLookup> {
        let url = format!("{}/{}", self.base_url, order_id);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(PortError::NotFound(order_id.to_string())),
            status if !status.is_success() => Err(PortError::Status(status.as_u16())),
            _ => {
                let body = response.text().await.map_err(map_transport_error)?;
                parse_order(&body)
            }
        }
    }
}

//=========================================================================================
// Stub Order Lookup
//=========================================================================================

/// Answers lookups from a fixed in-memory table. Order ids match case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct StubOrderLookupAdapter {
    orders: HashMap<String, OrderLookup>,
}

impl StubOrderLookupAdapter {
    pub fn new(orders: impl IntoIterator<Item = OrderLookup>) -> Self {
        let orders = orders
            .into_iter()
            .map(|order| (order.order_id.to_ascii_uppercase(), order))
            .collect();
        Self { orders }
    }

    /// A handful of demo orders for local runs.
    pub fn demo() -> Self {
        let order = |id: &str, status: &str, (y, m, d): (i32, u32, u32)| {
            NaiveDate::from_ymd_opt(y, m, d).map(|estimated_delivery| OrderLookup {
                order_id: id.to_string(),
                status: status.to_string(),
                estimated_delivery,
            })
        };
        Self::new(
            [
                order("A1001", "processing", (2026, 11, 2)),
                order("B2002", "shipped", (2026, 10, 24)),
                order("C3003", "delivered", (2026, 10, 12)),
            ]
            .into_iter()
            .flatten(),
        )
    }
}

#[async_trait]
impl OrderLookupService for StubOrderLookupAdapter {
    async fn lookup_order(&self, order_id: &str) -> PortResult<OrderLookup> {
        self.orders
            .get(&order_id.to_ascii_uppercase())
            .cloned()
            .ok_or_else(|| PortError::NotFound(order_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_timestamp_dates() {
        let plain = parse_order(
            r#"{"orderId":"A1","status":"shipped","estimatedDelivery":"2026-10-30"}"#,
        )
        .unwrap();
        assert_eq!(plain.estimated_delivery, NaiveDate::from_ymd_opt(2026, 10, 30).unwrap());

        let stamped = parse_order(
            r#"{"orderId":"A1","status":"shipped","estimatedDelivery":"2026-10-30T09:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(stamped.estimated_delivery, plain.estimated_delivery);
    }

    #[test]
    fn missing_fields_are_malformed() {
        assert!(matches!(
            parse_order(r#"{"orderId":"A1"}"#),
            Err(PortError::Malformed(_))
        ));
        assert!(matches!(
            parse_order(r#"{"orderId":"A1","status":"x","estimatedDelivery":"soon"}"#),
            Err(PortError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn stub_lookup_ignores_case() {
        let stub = StubOrderLookupAdapter::demo();
        let order = stub.lookup_order("b2002").await.unwrap();
        assert_eq!(order.status, "shipped");
        assert!(matches!(
            stub.lookup_order("Z9").await,
            Err(PortError::NotFound(_))
        ));
    }
}
