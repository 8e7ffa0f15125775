//! Shopping baskets

use tracing::{debug, info};

use super::{positions, ServiceError, ServiceResult};
use crate::db::repository::{baskets, users};
use crate::db::{BasketWithPositions, DbPool, LineItem};

pub async fn get_basket(pool: &DbPool, id: i64) -> ServiceResult<BasketWithPositions> {
    baskets::get_by_id(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Basket {} not found", id)))
}

pub async fn get_user_basket(pool: &DbPool, user_id: i64) -> ServiceResult<BasketWithPositions> {
    baskets::get_by_user_id(pool, user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Basket for user {} not found", user_id)))
}

/// Open a basket for a user who has none
pub async fn create_basket(pool: &DbPool, user_id: i64) -> ServiceResult<BasketWithPositions> {
    if users::get_by_id(pool, user_id).await?.is_none() {
        return Err(ServiceError::not_found(format!("User {} not found", user_id)));
    }
    if baskets::get_by_user_id(pool, user_id).await?.is_some() {
        return Err(ServiceError::bad_request(format!(
            "User {} already has a basket",
            user_id
        )));
    }

    let basket = baskets::create(pool, user_id).await?;
    info!(basket_id = basket.id, user_id, "Opened basket");
    Ok(basket)
}

async fn store(pool: &DbPool, basket_id: i64, user_id: i64, items: &[LineItem]) -> ServiceResult<BasketWithPositions> {
    let positions = baskets::replace_positions(pool, basket_id, items).await?;
    Ok(BasketWithPositions {
        id: basket_id,
        user_id,
        positions,
    })
}

/// Merge `items` into the basket, one position per phone
pub async fn add_products(pool: &DbPool, id: i64, items: &[LineItem]) -> ServiceResult<BasketWithPositions> {
    positions::validate(items)?;
    let basket = get_basket(pool, id).await?;

    let merged = positions::merge(&basket.line_items(), items)?;
    debug!(basket_id = id, positions = merged.len(), "Adding to basket");
    store(pool, basket.id, basket.user_id, &merged).await
}

/// Decrement or drop positions. An empty list clears the basket.
pub async fn remove_products(pool: &DbPool, id: i64, items: &[LineItem]) -> ServiceResult<BasketWithPositions> {
    positions::validate(items)?;
    let basket = get_basket(pool, id).await?;

    let remaining = if items.is_empty() {
        Vec::new()
    } else {
        positions::subtract(&basket.line_items(), items)
    };
    debug!(basket_id = id, positions = remaining.len(), "Removing from basket");
    store(pool, basket.id, basket.user_id, &remaining).await
}

/// Live total at current phone prices
pub async fn total_price(pool: &DbPool, id: i64) -> ServiceResult<i64> {
    get_basket(pool, id).await?;
    Ok(baskets::total_price(pool, id).await?)
}
