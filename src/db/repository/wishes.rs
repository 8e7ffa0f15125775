use sqlx::Result;

use crate::db::{DbPool, Wish};

/// Insert a wish; `None` when the (user, phone) pair already exists
pub async fn create(pool: &DbPool, user_id: i64, phone_id: i64) -> Result<Option<Wish>> {
    let result = sqlx::query(
        "INSERT INTO wishes (user_id, phone_id) VALUES (?, ?) ON CONFLICT (user_id, phone_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(phone_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_by_id(pool, result.last_insert_rowid()).await
}

pub async fn get_by_id(pool: &DbPool, id: i64) -> Result<Option<Wish>> {
    sqlx::query_as::<_, Wish>("SELECT * FROM wishes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_user(pool: &DbPool, user_id: i64) -> Result<Vec<Wish>> {
    sqlx::query_as::<_, Wish>("SELECT * FROM wishes WHERE user_id = ? ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub async fn delete(pool: &DbPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM wishes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
