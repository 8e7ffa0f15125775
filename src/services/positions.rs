//! Line-item reconciliation shared by baskets and orders.
//!
//! A basket or order holds at most one position per phone. Adding merges
//! quantities into the existing position; removing decrements it and drops
//! the position once nothing is left.

use crate::db::LineItem;

use super::{ServiceError, ServiceResult};

/// Largest quantity a single position may hold
pub const MAX_QUANTITY: i64 = 10_000;

fn add_quantity(position: &mut LineItem, quantity: i64) -> ServiceResult<()> {
    match position.quantity.checked_add(quantity) {
        Some(total) if total <= MAX_QUANTITY => {
            position.quantity = total;
            Ok(())
        }
        _ => Err(ServiceError::bad_request(format!(
            "Quantity for phone {} cannot exceed {}",
            position.phone_id, MAX_QUANTITY
        ))),
    }
}

/// Collapse repeated phone ids by summing their quantities. First-seen
/// order is kept.
pub fn consolidate(items: &[LineItem]) -> ServiceResult<Vec<LineItem>> {
    let mut result: Vec<LineItem> = Vec::with_capacity(items.len());
    for item in items {
        match result.iter_mut().find(|p| p.phone_id == item.phone_id) {
            Some(existing) => add_quantity(existing, item.quantity)?,
            None => result.push(*item),
        }
    }
    Ok(result)
}

/// Add `incoming` to `existing`, merging by phone id
pub fn merge(existing: &[LineItem], incoming: &[LineItem]) -> ServiceResult<Vec<LineItem>> {
    let mut merged = consolidate(existing)?;
    for item in consolidate(incoming)? {
        match merged.iter_mut().find(|p| p.phone_id == item.phone_id) {
            Some(position) => add_quantity(position, item.quantity)?,
            None => merged.push(item),
        }
    }
    Ok(merged)
}

/// Remove `removal` from `existing`.
///
/// Repeated phone ids in `removal` are summed first. A position whose
/// removal quantity reaches its current quantity is dropped; otherwise it
/// is decremented. Positions not mentioned stay as they are.
pub fn subtract(existing: &[LineItem], removal: &[LineItem]) -> Vec<LineItem> {
    existing
        .iter()
        .filter_map(|position| {
            let removed = removal
                .iter()
                .filter(|r| r.phone_id == position.phone_id)
                .fold(0i64, |sum, r| sum.saturating_add(r.quantity));
            if removed == 0 {
                Some(*position)
            } else if removed >= position.quantity {
                None
            } else {
                Some(LineItem::new(position.phone_id, position.quantity - removed))
            }
        })
        .collect()
}

/// Reject non-positive ids and quantities outside `1..=MAX_QUANTITY`
pub fn validate(items: &[LineItem]) -> ServiceResult<()> {
    for item in items {
        if item.phone_id <= 0 {
            return Err(ServiceError::bad_request(format!(
                "Invalid phone id: {}",
                item.phone_id
            )));
        }
        if item.quantity <= 0 {
            return Err(ServiceError::bad_request(format!(
                "Quantity for phone {} must be greater than 0",
                item.phone_id
            )));
        }
        if item.quantity > MAX_QUANTITY {
            return Err(ServiceError::bad_request(format!(
                "Quantity for phone {} cannot exceed {}",
                item.phone_id, MAX_QUANTITY
            )));
        }
    }
    Ok(())
}
