//! Wish lists

use super::{ServiceError, ServiceResult};
use crate::db::repository::{phones, users, wishes};
use crate::db::{DbPool, Wish};

pub async fn get_wish(pool: &DbPool, id: i64) -> ServiceResult<Wish> {
    wishes::get_by_id(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Wish {} not found", id)))
}

/// Add a phone to a user's wish list. Each phone appears at most once.
pub async fn create_wish(pool: &DbPool, user_id: i64, phone_id: i64) -> ServiceResult<Wish> {
    if users::get_by_id(pool, user_id).await?.is_none() {
        return Err(ServiceError::not_found(format!("User {} not found", user_id)));
    }
    if phones::get_by_id(pool, phone_id).await?.is_none() {
        return Err(ServiceError::not_found(format!("Phone {} not found", phone_id)));
    }

    wishes::create(pool, user_id, phone_id)
        .await?
        .ok_or_else(|| ServiceError::bad_request("wish already exists"))
}

pub async fn list_user_wishes(pool: &DbPool, user_id: i64) -> ServiceResult<Vec<Wish>> {
    if users::get_by_id(pool, user_id).await?.is_none() {
        return Err(ServiceError::not_found(format!("User {} not found", user_id)));
    }
    Ok(wishes::list_by_user(pool, user_id).await?)
}

pub async fn delete_wish(pool: &DbPool, id: i64) -> ServiceResult<()> {
    if !wishes::delete(pool, id).await? {
        return Err(ServiceError::not_found(format!("Wish {} not found", id)));
    }
    Ok(())
}
