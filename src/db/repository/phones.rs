use sqlx::{QueryBuilder, Result, Sqlite};

use crate::db::{DbPool, NewPhone, Phone, PhoneSearch, UpdatePhoneRequest};

pub async fn get_by_id(pool: &DbPool, id: i64) -> Result<Option<Phone>> {
    sqlx::query_as::<_, Phone>("SELECT * FROM phones WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &DbPool, phone: &NewPhone) -> Result<Phone> {
    let id = sqlx::query(
        r#"
        INSERT INTO phones (name, producer_name, os_name, ram_size, storage_size, camera_resolution, price)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&phone.name)
    .bind(&phone.producer_name)
    .bind(&phone.os_name)
    .bind(phone.ram_size)
    .bind(phone.storage_size)
    .bind(phone.camera_resolution)
    .bind(phone.price)
    .execute(pool)
    .await?
    .last_insert_rowid();

    sqlx::query_as::<_, Phone>("SELECT * FROM phones WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Apply a partial update; returns `None` when the phone does not exist
pub async fn update(pool: &DbPool, id: i64, changes: &UpdatePhoneRequest) -> Result<Option<Phone>> {
    let result = sqlx::query(
        r#"
        UPDATE phones SET
            name = COALESCE(?, name),
            producer_name = COALESCE(?, producer_name),
            os_name = COALESCE(?, os_name),
            ram_size = COALESCE(?, ram_size),
            storage_size = COALESCE(?, storage_size),
            camera_resolution = COALESCE(?, camera_resolution),
            price = COALESCE(?, price),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(&changes.name)
    .bind(&changes.producer_name)
    .bind(&changes.os_name)
    .bind(changes.ram_size)
    .bind(changes.storage_size)
    .bind(changes.camera_resolution)
    .bind(changes.price)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_by_id(pool, id).await
}

pub async fn delete(pool: &DbPool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM phones WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Make `%` and `_` match literally in a LIKE pattern using `\` as escape
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Filtered catalog page, ordered by id. `page` is 1-based.
pub async fn search(pool: &DbPool, filter: &PhoneSearch, page: u32, page_size: u32) -> Result<Vec<Phone>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM phones WHERE 1 = 1");

    // LIKE is case-insensitive for ASCII in SQLite
    for (column, value) in [
        ("name", &filter.name),
        ("producer_name", &filter.producer_name),
        ("os_name", &filter.os_name),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            qb.push(format!(" AND {} LIKE ", column))
                .push_bind(format!("%{}%", escape_like(value)))
                .push(" ESCAPE '\\'");
        }
    }

    for (column, min, max) in [
        ("ram_size", filter.min_ram_size, filter.max_ram_size),
        ("storage_size", filter.min_storage_size, filter.max_storage_size),
        ("camera_resolution", filter.min_camera_resolution, filter.max_camera_resolution),
        ("price", filter.min_price, filter.max_price),
    ] {
        if let Some(min) = min {
            qb.push(format!(" AND {} >= ", column)).push_bind(min);
        }
        if let Some(max) = max {
            qb.push(format!(" AND {} <= ", column)).push_bind(max);
        }
    }

    let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
    qb.push(" ORDER BY id LIMIT ")
        .push_bind(i64::from(page_size))
        .push(" OFFSET ")
        .push_bind(offset);

    qb.build_query_as::<Phone>().fetch_all(pool).await
}

pub async fn count(pool: &DbPool) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM phones")
        .fetch_one(pool)
        .await
}
