//! Demo data for local development
//!
//! Mirrors a small but complete shop: a seller and a customer (each with a
//! basket), two phones, one placed order with its payment, one comment and
//! one wish.

use anyhow::{Context, Result};
use tracing::info;

use super::repository::{comments, orders, payments, phones, users, wishes};
use super::{DbPool, LineItem, NewPhone, NewUser, Role};
use crate::crypto::hash_password;

const DEMO_PASSWORD: &str = "testpswd";

/// Insert demo rows unless the database already holds users
pub async fn seed_demo_data(pool: &DbPool) -> Result<()> {
    if users::count(pool).await? > 0 {
        info!("Database already populated, skipping demo data");
        return Ok(());
    }

    info!("Seeding demo data...");

    let password_hash = hash_password(DEMO_PASSWORD)
        .map_err(|e| anyhow::anyhow!("Failed to hash demo password: {}", e))?;

    let customer = users::create(
        pool,
        &NewUser {
            name: "Pepe".to_string(),
            email: "testUser@test.com".to_string(),
            password_hash: password_hash.clone(),
            phone_number: "123123123".to_string(),
            role: Role::Customer,
        },
    )
    .await
    .context("Failed to seed customer")?;

    users::create(
        pool,
        &NewUser {
            name: "V".to_string(),
            email: "seller@test.com".to_string(),
            password_hash,
            phone_number: "123123123".to_string(),
            role: Role::Seller,
        },
    )
    .await
    .context("Failed to seed seller")?;

    let first = phones::create(
        pool,
        &NewPhone {
            name: "CoolPhone v1".to_string(),
            producer_name: "CoolProducer".to_string(),
            os_name: "DOS".to_string(),
            ram_size: 16,
            storage_size: 128,
            camera_resolution: 20,
            price: 20000,
        },
    )
    .await?;

    phones::create(
        pool,
        &NewPhone {
            name: "CoolPhone v2".to_string(),
            producer_name: "CoolProducer".to_string(),
            os_name: "DOS v2".to_string(),
            ram_size: 16,
            storage_size: 1228,
            camera_resolution: 220,
            price: 60000,
        },
    )
    .await?;

    let placed_at = chrono::Utc::now().to_rfc3339();
    let order = orders::create(
        pool,
        customer.id,
        "Moscow",
        &placed_at,
        &[LineItem::new(first.id, 1)],
    )
    .await?;
    payments::create_for_order(pool, order.id, true).await?;

    comments::create(pool, customer.id, first.id, "good").await?;
    wishes::create(pool, customer.id, first.id).await?;

    info!("Demo data seeded");
    Ok(())
}
