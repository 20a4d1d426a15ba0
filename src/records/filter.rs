// ABOUTME: Prunes orders newer than the cutoff and items left without an order.
// ABOUTME: Filtering is a stable subsequence selection over both collections.

use std::collections::HashSet;

use super::{Order, OrderItem, TrainingSet};
use crate::error::TimeError;
use crate::time;

/// Restrict the collections to the training window ending at `cutoff`.
///
/// With no cutoff the inputs pass through unchanged. Otherwise every order
/// whose time is strictly after the cutoff is dropped, then every item whose
/// order did not survive. Survivors keep their input order.
///
/// A malformed order time fails the whole call.
pub fn filter(
    items: Vec<OrderItem>,
    orders: Vec<Order>,
    cutoff: Option<i64>,
) -> Result<TrainingSet, TimeError> {
    filter_with(items, orders, cutoff, |order| time::parse(&order.time))
}

/// Like [`filter`], with a caller-supplied order clock.
pub fn filter_with<F>(
    items: Vec<OrderItem>,
    orders: Vec<Order>,
    cutoff: Option<i64>,
    mut millis: F,
) -> Result<TrainingSet, TimeError>
where
    F: FnMut(&Order) -> Result<i64, TimeError>,
{
    let Some(cutoff) = cutoff else {
        return Ok(TrainingSet { items, orders });
    };

    let mut kept = Vec::with_capacity(orders.len());
    for order in orders {
        if millis(&order)? <= cutoff {
            kept.push(order);
        }
    }

    let ids: HashSet<i64> = kept.iter().map(|o| o.id).collect();
    let items = items
        .into_iter()
        .filter(|item| ids.contains(&item.order_id))
        .collect();

    Ok(TrainingSet {
        items,
        orders: kept,
    })
}
