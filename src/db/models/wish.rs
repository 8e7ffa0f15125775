use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Wish {
    pub id: i64,
    pub user_id: i64,
    pub phone_id: i64,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateWishRequest {
    pub user_id: Option<i64>,
    pub phone_id: Option<i64>,
}
