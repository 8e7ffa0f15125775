//! Basket models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::LineItem;

#[derive(Debug, Clone, FromRow)]
pub struct Basket {
    pub id: i64,
    pub user_id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BasketPosition {
    pub id: i64,
    pub basket_id: i64,
    pub phone_id: i64,
    pub quantity: i64,
}

impl BasketPosition {
    pub fn line_item(&self) -> LineItem {
        LineItem::new(self.phone_id, self.quantity)
    }
}

/// A basket together with its current positions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketWithPositions {
    pub id: i64,
    pub user_id: i64,
    pub positions: Vec<BasketPosition>,
}

impl BasketWithPositions {
    pub fn new(basket: Basket, positions: Vec<BasketPosition>) -> Self {
        Self {
            id: basket.id,
            user_id: basket.user_id,
            positions,
        }
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        self.positions.iter().map(BasketPosition::line_item).collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBasketRequest {
    pub user_id: Option<i64>,
}

/// Query string for the removal endpoint: `?phoneids=1,2&amounts=3,1`
#[derive(Debug, Default, Deserialize)]
pub struct RemoveFromBasketQuery {
    pub phoneids: Option<String>,
    pub amounts: Option<String>,
}
