//! Types shared by baskets and orders.

use serde::{Deserialize, Serialize};

/// A (phone, quantity) pair as submitted by clients and as persisted in
/// basket and order position tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub phone_id: i64,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(phone_id: i64, quantity: i64) -> Self {
        Self { phone_id, quantity }
    }
}

/// Body for endpoints that add or remove a list of line items
#[derive(Debug, Deserialize)]
pub struct LineItemsRequest {
    #[serde(default)]
    pub positions: Vec<LineItem>,
}

/// Live total of a basket or order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalPriceResponse {
    pub id: i64,
    pub total_price: i64,
}

/// A basket or order together with its live total
#[derive(Debug, Serialize)]
pub struct Priced<T> {
    #[serde(flatten)]
    pub inner: T,
    pub total_price: i64,
}
