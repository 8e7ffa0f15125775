//! Payment models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// `status` is true once the order is paid. `sum` is frozen at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub status: bool,
    pub sum: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub order_id: Option<i64>,
    pub status: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub status: Option<bool>,
}
