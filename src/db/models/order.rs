//! Order models and status lifecycle.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::LineItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Completed and cancelled orders never change status again
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether moving from `self` to `next` is allowed. Re-applying the
    /// current status is accepted as a no-op.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (OrderStatus::Placed, OrderStatus::Processing)
                | (OrderStatus::Placed, OrderStatus::Cancelled)
                | (OrderStatus::Processing, OrderStatus::Completed)
                | (OrderStatus::Processing, OrderStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Placed => write!(f, "placed"),
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub address: String,
    pub placed_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OrderPosition {
    pub id: i64,
    pub order_id: i64,
    pub phone_id: i64,
    pub quantity: i64,
}

impl OrderPosition {
    pub fn line_item(&self) -> LineItem {
        LineItem::new(self.phone_id, self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithPositions {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub address: String,
    pub placed_at: String,
    pub positions: Vec<OrderPosition>,
}

impl OrderWithPositions {
    pub fn new(order: Order, positions: Vec<OrderPosition>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            status: order.status,
            address: order.address,
            placed_at: order.placed_at,
            positions,
        }
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        self.positions.iter().map(OrderPosition::line_item).collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: Option<i64>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub positions: Vec<LineItem>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: Option<OrderStatus>,
}
