use sqlx::Result;

use crate::db::{DbPool, Payment};

/// Create the payment for an order. The sum is computed from the order's
/// positions at today's prices and stored; later price changes do not
/// touch it.
pub async fn create_for_order(pool: &DbPool, order_id: i64, status: bool) -> Result<Payment> {
    let mut tx = pool.begin().await?;

    let sum: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(pos.quantity * p.price), 0)
        FROM positions pos
        INNER JOIN phones p ON p.id = pos.phone_id
        WHERE pos.order_id = ?
        "#,
    )
    .bind(order_id)
    .fetch_one(&mut *tx)
    .await?;

    let id = sqlx::query("INSERT INTO payments (order_id, status, sum) VALUES (?, ?, ?)")
        .bind(order_id)
        .bind(status)
        .bind(sum)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(payment)
}

pub async fn get_by_id(pool: &DbPool, id: i64) -> Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_by_order_id(pool: &DbPool, order_id: i64) -> Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = ?")
        .bind(order_id)
        .fetch_optional(pool)
        .await
}

pub async fn update_status(pool: &DbPool, id: i64, status: bool) -> Result<Option<Payment>> {
    let result = sqlx::query("UPDATE payments SET status = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_by_id(pool, id).await
}

pub async fn delete(pool: &DbPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM payments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
