use sqlx::Result;

use crate::db::{DbPool, LineItem, Order, OrderPosition, OrderStatus, OrderWithPositions};

async fn positions(pool: &DbPool, order_id: i64) -> Result<Vec<OrderPosition>> {
    sqlx::query_as::<_, OrderPosition>("SELECT * FROM positions WHERE order_id = ? ORDER BY id")
        .bind(order_id)
        .fetch_all(pool)
        .await
}

pub async fn get_by_id(pool: &DbPool, id: i64) -> Result<Option<OrderWithPositions>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match order {
        Some(order) => {
            let positions = positions(pool, order.id).await?;
            Ok(Some(OrderWithPositions::new(order, positions)))
        }
        None => Ok(None),
    }
}

pub async fn list_by_user(pool: &DbPool, user_id: i64) -> Result<Vec<OrderWithPositions>> {
    let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE user_id = ? ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    let mut results = Vec::with_capacity(orders.len());
    for order in orders {
        let positions = positions(pool, order.id).await?;
        results.push(OrderWithPositions::new(order, positions));
    }
    Ok(results)
}

/// Insert the order row and all of its positions atomically
pub async fn create(
    pool: &DbPool,
    user_id: i64,
    address: &str,
    placed_at: &str,
    items: &[LineItem],
) -> Result<OrderWithPositions> {
    let mut tx = pool.begin().await?;

    let order_id = sqlx::query(
        "INSERT INTO orders (user_id, status, address, placed_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(OrderStatus::Placed)
    .bind(address)
    .bind(placed_at)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for item in items {
        sqlx::query("INSERT INTO positions (order_id, phone_id, quantity) VALUES (?, ?, ?)")
            .bind(order_id)
            .bind(item.phone_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    get_by_id(pool, order_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// Replace every position of the order with `items` (delete-all, then reinsert)
pub async fn replace_positions(pool: &DbPool, order_id: i64, items: &[LineItem]) -> Result<Vec<OrderPosition>> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM positions WHERE order_id = ?")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    let mut inserted = Vec::with_capacity(items.len());
    for item in items {
        let id = sqlx::query("INSERT INTO positions (order_id, phone_id, quantity) VALUES (?, ?, ?)")
            .bind(order_id)
            .bind(item.phone_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        inserted.push(OrderPosition {
            id,
            order_id,
            phone_id: item.phone_id,
            quantity: item.quantity,
        });
    }

    sqlx::query("UPDATE orders SET updated_at = datetime('now') WHERE id = ?")
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(inserted)
}

pub async fn update_status(pool: &DbPool, id: i64, status: OrderStatus) -> Result<bool> {
    let result = sqlx::query("UPDATE orders SET status = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Positions and the payment go with the order through ON DELETE CASCADE
pub async fn delete(pool: &DbPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Sum of quantity x current phone price over the order
pub async fn total_price(pool: &DbPool, order_id: i64) -> Result<i64> {
    sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(pos.quantity * p.price), 0)
        FROM positions pos
        INNER JOIN phones p ON p.id = pos.phone_id
        WHERE pos.order_id = ?
        "#,
    )
    .bind(order_id)
    .fetch_one(pool)
    .await
}
