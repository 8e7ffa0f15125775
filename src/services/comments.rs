//! Product comments and their like/dislike counter

use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::db::repository::{comments, phones, users};
use crate::db::{Comment, DbPool};

pub async fn get_comment(pool: &DbPool, id: i64) -> ServiceResult<Comment> {
    comments::get_by_id(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Comment {} not found", id)))
}

pub async fn create_comment(pool: &DbPool, user_id: i64, phone_id: i64, text: &str) -> ServiceResult<Comment> {
    if text.trim().is_empty() {
        return Err(ServiceError::bad_request("Comment text is required"));
    }
    if users::get_by_id(pool, user_id).await?.is_none() {
        return Err(ServiceError::not_found(format!("User {} not found", user_id)));
    }
    if phones::get_by_id(pool, phone_id).await?.is_none() {
        return Err(ServiceError::not_found(format!("Phone {} not found", phone_id)));
    }

    let comment = comments::create(pool, user_id, phone_id, text).await?;
    info!(comment_id = comment.id, phone_id, "Comment added");
    Ok(comment)
}

/// Comments for a phone, oldest first
pub async fn list_phone_comments(pool: &DbPool, phone_id: i64) -> ServiceResult<Vec<Comment>> {
    if phones::get_by_id(pool, phone_id).await?.is_none() {
        return Err(ServiceError::not_found(format!("Phone {} not found", phone_id)));
    }
    Ok(comments::list_by_phone(pool, phone_id).await?)
}

/// Move the rate up one for a like, down one otherwise. The counter is
/// unbounded and may go negative.
pub async fn rate_comment(pool: &DbPool, id: i64, liked: bool) -> ServiceResult<Comment> {
    let comment = get_comment(pool, id).await?;
    let rate = if liked { comment.rate + 1 } else { comment.rate - 1 };

    comments::set_rate(pool, id, rate)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Comment {} not found", id)))
}

pub async fn delete_comment(pool: &DbPool, id: i64) -> ServiceResult<()> {
    if !comments::delete(pool, id).await? {
        return Err(ServiceError::not_found(format!("Comment {} not found", id)));
    }
    Ok(())
}
