use sqlx::Result;

use crate::db::{Basket, BasketPosition, BasketWithPositions, DbPool, LineItem};

async fn positions(pool: &DbPool, basket_id: i64) -> Result<Vec<BasketPosition>> {
    sqlx::query_as::<_, BasketPosition>(
        "SELECT * FROM basketpositions WHERE basket_id = ? ORDER BY id",
    )
    .bind(basket_id)
    .fetch_all(pool)
    .await
}

pub async fn get_by_id(pool: &DbPool, id: i64) -> Result<Option<BasketWithPositions>> {
    let basket = sqlx::query_as::<_, Basket>("SELECT * FROM baskets WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match basket {
        Some(basket) => {
            let positions = positions(pool, basket.id).await?;
            Ok(Some(BasketWithPositions::new(basket, positions)))
        }
        None => Ok(None),
    }
}

pub async fn get_by_user_id(pool: &DbPool, user_id: i64) -> Result<Option<BasketWithPositions>> {
    let basket = sqlx::query_as::<_, Basket>("SELECT * FROM baskets WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    match basket {
        Some(basket) => {
            let positions = positions(pool, basket.id).await?;
            Ok(Some(BasketWithPositions::new(basket, positions)))
        }
        None => Ok(None),
    }
}

pub async fn create(pool: &DbPool, user_id: i64) -> Result<BasketWithPositions> {
    let id = sqlx::query("INSERT INTO baskets (user_id) VALUES (?)")
        .bind(user_id)
        .execute(pool)
        .await?
        .last_insert_rowid();

    let basket = sqlx::query_as::<_, Basket>("SELECT * FROM baskets WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(BasketWithPositions::new(basket, Vec::new()))
}

/// Replace every position of the basket with `items` (delete-all, then reinsert)
pub async fn replace_positions(
    pool: &DbPool,
    basket_id: i64,
    items: &[LineItem],
) -> Result<Vec<BasketPosition>> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM basketpositions WHERE basket_id = ?")
        .bind(basket_id)
        .execute(&mut *tx)
        .await?;

    let mut inserted = Vec::with_capacity(items.len());
    for item in items {
        let id = sqlx::query(
            "INSERT INTO basketpositions (basket_id, phone_id, quantity) VALUES (?, ?, ?)",
        )
        .bind(basket_id)
        .bind(item.phone_id)
        .bind(item.quantity)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        inserted.push(BasketPosition {
            id,
            basket_id,
            phone_id: item.phone_id,
            quantity: item.quantity,
        });
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Sum of quantity x current phone price over the basket
pub async fn total_price(pool: &DbPool, basket_id: i64) -> Result<i64> {
    sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(bp.quantity * p.price), 0)
        FROM basketpositions bp
        INNER JOIN phones p ON p.id = bp.phone_id
        WHERE bp.basket_id = ?
        "#,
    )
    .bind(basket_id)
    .fetch_one(pool)
    .await
}
