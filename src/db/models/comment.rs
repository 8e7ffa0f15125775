//! Product comments.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub user_id: i64,
    pub phone_id: i64,
    pub text: String,
    pub rate: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub user_id: Option<i64>,
    pub phone_id: Option<i64>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct RateCommentRequest {
    pub liked: Option<bool>,
}
