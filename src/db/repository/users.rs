use sqlx::Result;

use crate::db::{DbPool, NewUser, User, UserChanges};

pub async fn get_by_id(pool: &DbPool, id: i64) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Insert a user together with their (empty) basket
pub async fn create(pool: &DbPool, user: &NewUser) -> Result<User> {
    let mut tx = pool.begin().await?;

    let user_id = sqlx::query(
        r#"
        INSERT INTO users (name, email, password_hash, phone_number, role)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.phone_number)
    .bind(user.role)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    sqlx::query("INSERT INTO baskets (user_id) VALUES (?)")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let created = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(created)
}

/// Apply a partial update; returns `None` when the user does not exist
pub async fn update(pool: &DbPool, id: i64, changes: &UserChanges) -> Result<Option<User>> {
    let result = sqlx::query(
        r#"
        UPDATE users SET
            name = COALESCE(?, name),
            email = COALESCE(?, email),
            password_hash = COALESCE(?, password_hash),
            phone_number = COALESCE(?, phone_number),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&changes.name)
    .bind(&changes.email)
    .bind(&changes.password_hash)
    .bind(&changes.phone_number)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_by_id(pool, id).await
}

pub async fn delete(pool: &DbPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count(pool: &DbPool) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}
