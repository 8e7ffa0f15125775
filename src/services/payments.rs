//! Order payments. An order carries at most one payment and its sum is a
//! snapshot taken when the payment is created.

use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::db::repository::{orders, payments};
use crate::db::{DbPool, Payment};

pub async fn get_payment(pool: &DbPool, id: i64) -> ServiceResult<Payment> {
    payments::get_by_id(pool, id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Payment {} not found", id)))
}

pub async fn get_order_payment(pool: &DbPool, order_id: i64) -> ServiceResult<Payment> {
    if orders::get_by_id(pool, order_id).await?.is_none() {
        return Err(ServiceError::not_found(format!("Order {} not found", order_id)));
    }
    payments::get_by_order_id(pool, order_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Payment for order {} not found", order_id)))
}

/// Create the payment for an order; `status` defaults to paid
pub async fn create_payment(pool: &DbPool, order_id: i64, status: Option<bool>) -> ServiceResult<Payment> {
    if orders::get_by_id(pool, order_id).await?.is_none() {
        return Err(ServiceError::not_found(format!("Order {} not found", order_id)));
    }
    if payments::get_by_order_id(pool, order_id).await?.is_some() {
        return Err(ServiceError::bad_request(format!(
            "Order {} already has a payment",
            order_id
        )));
    }

    let payment = payments::create_for_order(pool, order_id, status.unwrap_or(true)).await?;
    info!(payment_id = payment.id, order_id, sum = payment.sum, "Payment created");
    Ok(payment)
}

pub async fn update_payment(pool: &DbPool, id: i64, status: bool) -> ServiceResult<Payment> {
    payments::update_status(pool, id, status)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Payment {} not found", id)))
}

pub async fn delete_payment(pool: &DbPool, id: i64) -> ServiceResult<()> {
    if !payments::delete(pool, id).await? {
        return Err(ServiceError::not_found(format!("Payment {} not found", id)));
    }
    info!(payment_id = id, "Payment deleted");
    Ok(())
}
