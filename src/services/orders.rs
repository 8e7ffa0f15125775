//! Orders and their status lifecycle.
//!
//! Order positions follow the same reconciliation rules as baskets: one
//! position per phone, merged on add and decremented on removal.

use tracing::info;

use super::{positions, ServiceError, ServiceResult};
use crate::db::repository::{orders, users};
use crate::db::{DbPool, LineItem, OrderStatus, OrderWithPositions};

pub async fn get_order(pool: &DbPool, id: i64) -> ServiceResult<OrderWithPositions> {
    orders::get_by_id(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Order {} not found", id)))
}

/// All orders of a user. An existing user with no orders gets an empty list.
pub async fn list_user_orders(pool: &DbPool, user_id: i64) -> ServiceResult<Vec<OrderWithPositions>> {
    if users::get_by_id(pool, user_id).await?.is_none() {
        return Err(ServiceError::not_found(format!("User {} not found", user_id)));
    }
    Ok(orders::list_by_user(pool, user_id).await?)
}

/// Place a new order in the `placed` status
pub async fn place_order(
    pool: &DbPool,
    user_id: i64,
    address: &str,
    items: &[LineItem],
) -> ServiceResult<OrderWithPositions> {
    if address.trim().is_empty() {
        return Err(ServiceError::bad_request("Address is required"));
    }
    if items.is_empty() {
        return Err(ServiceError::bad_request("An order needs at least one position"));
    }
    positions::validate(items)?;

    if users::get_by_id(pool, user_id).await?.is_none() {
        return Err(ServiceError::not_found(format!("User {} not found", user_id)));
    }

    let placed_at = chrono::Utc::now().to_rfc3339();
    let order = orders::create(pool, user_id, address, &placed_at, &positions::consolidate(items)?).await?;

    info!(order_id = order.id, user_id, "Order placed");
    Ok(order)
}

fn ensure_editable(order: &OrderWithPositions) -> ServiceResult<()> {
    if order.status.is_terminal() {
        return Err(ServiceError::bad_request(format!(
            "Order {} is {} and can no longer change",
            order.id, order.status
        )));
    }
    Ok(())
}

/// Move an order along its lifecycle
pub async fn update_status(pool: &DbPool, id: i64, status: OrderStatus) -> ServiceResult<OrderWithPositions> {
    let order = get_order(pool, id).await?;
    if !order.status.can_transition_to(status) {
        return Err(ServiceError::bad_request(format!(
            "Cannot change order status from {} to {}",
            order.status, status
        )));
    }

    if order.status != status {
        orders::update_status(pool, id, status).await?;
        info!(order_id = id, from = %order.status, to = %status, "Order status changed");
    }
    get_order(pool, id).await
}

pub async fn add_positions(pool: &DbPool, id: i64, items: &[LineItem]) -> ServiceResult<OrderWithPositions> {
    positions::validate(items)?;
    let order = get_order(pool, id).await?;
    ensure_editable(&order)?;

    let merged = positions::merge(&order.line_items(), items)?;
    orders::replace_positions(pool, id, &merged).await?;
    get_order(pool, id).await
}

pub async fn remove_positions(pool: &DbPool, id: i64, items: &[LineItem]) -> ServiceResult<OrderWithPositions> {
    if items.is_empty() {
        return Err(ServiceError::bad_request("No positions to remove"));
    }
    positions::validate(items)?;
    let order = get_order(pool, id).await?;
    ensure_editable(&order)?;

    let remaining = positions::subtract(&order.line_items(), items);
    orders::replace_positions(pool, id, &remaining).await?;
    get_order(pool, id).await
}

/// Delete an order together with its positions and payment
pub async fn delete_order(pool: &DbPool, id: i64) -> ServiceResult<()> {
    if !orders::delete(pool, id).await? {
        return Err(ServiceError::not_found(format!("Order {} not found", id)));
    }
    info!(order_id = id, "Order deleted");
    Ok(())
}

/// Live total at current phone prices
pub async fn total_price(pool: &DbPool, id: i64) -> ServiceResult<i64> {
    get_order(pool, id).await?;
    Ok(orders::total_price(pool, id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{add_customer, add_phone};

    #[tokio::test]
    async fn test_place_order_merges_duplicate_phones() {
        let pool = crate::db::test_pool().await;
        let user = add_customer(&pool, "pepe@test.com").await;
        let p1 = add_phone(&pool, "P1", 100).await;
        let p2 = add_phone(&pool, "P2", 300).await;

        let order = place_order(
            &pool,
            user.id,
            "Moscow",
            &[LineItem::new(p1.id, 1), LineItem::new(p2.id, 1), LineItem::new(p1.id, 2)],
        )
        .await
        .unwrap();

        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.line_items(), vec![LineItem::new(p1.id, 3), LineItem::new(p2.id, 1)]);
        assert_eq!(total_price(&pool, order.id).await.unwrap(), 600);
    }

    #[tokio::test]
    async fn test_place_order_validation() {
        let pool = crate::db::test_pool().await;
        let user = add_customer(&pool, "pepe@test.com").await;
        let p1 = add_phone(&pool, "P1", 100).await;

        assert!(matches!(
            place_order(&pool, user.id, "Moscow", &[]).await,
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            place_order(&pool, user.id, "  ", &[LineItem::new(p1.id, 1)]).await,
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            place_order(&pool, 404, "Moscow", &[LineItem::new(p1.id, 1)]).await,
            Err(ServiceError::NotFound(_))
        ));
        // unknown phone trips the foreign key and nothing is left behind
        assert!(place_order(&pool, user.id, "Moscow", &[LineItem::new(999, 1)]).await.is_err());
        assert!(list_user_orders(&pool, user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_lifecycle() {
        let pool = crate::db::test_pool().await;
        let user = add_customer(&pool, "pepe@test.com").await;
        let p1 = add_phone(&pool, "P1", 100).await;
        let order = place_order(&pool, user.id, "Moscow", &[LineItem::new(p1.id, 1)])
            .await
            .unwrap();

        assert!(matches!(
            update_status(&pool, order.id, OrderStatus::Completed).await,
            Err(ServiceError::BadRequest(_))
        ));

        let order = update_status(&pool, order.id, OrderStatus::Processing).await.unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        let order = update_status(&pool, order.id, OrderStatus::Processing).await.unwrap();
        assert_eq!(order.status, OrderStatus::Processing);

        let order = update_status(&pool, order.id, OrderStatus::Completed).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert!(matches!(
            update_status(&pool, order.id, OrderStatus::Cancelled).await,
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            add_positions(&pool, order.id, &[LineItem::new(p1.id, 1)]).await,
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_edit_positions() {
        let pool = crate::db::test_pool().await;
        let user = add_customer(&pool, "pepe@test.com").await;
        let p1 = add_phone(&pool, "P1", 100).await;
        let p2 = add_phone(&pool, "P2", 300).await;
        let order = place_order(&pool, user.id, "Moscow", &[LineItem::new(p1.id, 2)])
            .await
            .unwrap();

        let order = add_positions(&pool, order.id, &[LineItem::new(p1.id, 1), LineItem::new(p2.id, 1)])
            .await
            .unwrap();
        assert_eq!(order.line_items(), vec![LineItem::new(p1.id, 3), LineItem::new(p2.id, 1)]);

        let order = remove_positions(&pool, order.id, &[LineItem::new(p2.id, 5)]).await.unwrap();
        assert_eq!(order.line_items(), vec![LineItem::new(p1.id, 3)]);

        assert!(matches!(
            remove_positions(&pool, order.id, &[]).await,
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_position_edit_rolls_back() {
        let pool = crate::db::test_pool().await;
        let user = add_customer(&pool, "pepe@test.com").await;
        let p1 = add_phone(&pool, "P1", 100).await;
        let order = place_order(&pool, user.id, "Moscow", &[LineItem::new(p1.id, 2)])
            .await
            .unwrap();

        let result = add_positions(&pool, order.id, &[LineItem::new(p1.id, 1), LineItem::new(999, 1)]).await;
        assert!(result.is_err());

        let direct = orders::replace_positions(&pool, order.id, &[LineItem::new(p1.id, 7), LineItem::new(999, 1)]).await;
        assert!(direct.is_err());

        let stored = get_order(&pool, order.id).await.unwrap();
        assert_eq!(stored.line_items(), vec![LineItem::new(p1.id, 2)]);
        assert_eq!(total_price(&pool, order.id).await.unwrap(), 200);
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let pool = crate::db::test_pool().await;
        let user = add_customer(&pool, "pepe@test.com").await;
        let p1 = add_phone(&pool, "P1", 100).await;

        assert!(list_user_orders(&pool, user.id).await.unwrap().is_empty());
        assert!(matches!(list_user_orders(&pool, 404).await, Err(ServiceError::NotFound(_))));

        let order = place_order(&pool, user.id, "Moscow", &[LineItem::new(p1.id, 1)])
            .await
            .unwrap();
        assert_eq!(list_user_orders(&pool, user.id).await.unwrap().len(), 1);

        delete_order(&pool, order.id).await.unwrap();
        assert!(matches!(get_order(&pool, order.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(delete_order(&pool, order.id).await, Err(ServiceError::NotFound(_))));
    }
}
