use sqlx::Result;

use crate::db::{Comment, DbPool};

pub async fn create(pool: &DbPool, user_id: i64, phone_id: i64, text: &str) -> Result<Comment> {
    let id = sqlx::query("INSERT INTO comments (user_id, phone_id, text, rate) VALUES (?, ?, ?, 0)")
        .bind(user_id)
        .bind(phone_id)
        .bind(text)
        .execute(pool)
        .await?
        .last_insert_rowid();

    sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_by_id(pool: &DbPool, id: i64) -> Result<Option<Comment>> {
    sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_phone(pool: &DbPool, phone_id: i64) -> Result<Vec<Comment>> {
    sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE phone_id = ? ORDER BY id")
        .bind(phone_id)
        .fetch_all(pool)
        .await
}

/// Store a new rate value computed by the caller
pub async fn set_rate(pool: &DbPool, id: i64, rate: i64) -> Result<Option<Comment>> {
    let result = sqlx::query("UPDATE comments SET rate = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(rate)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_by_id(pool, id).await
}

pub async fn delete(pool: &DbPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
