// ABOUTME: Order and OrderItem entities as served by the persistence service.
// ABOUTME: Only ids and order times matter for filtering; the rest is payload.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TimeError;
use crate::time;

/// Payload fields the core ignores; the persistence service may send `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A completed purchase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: i64,
    /// ISO local date-time of the purchase.
    pub time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total_price_in_cents: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub address_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address1: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address2: String,
    #[serde(deserialize_with = "null_as_default")]
    pub credit_card_company: String,
    #[serde(deserialize_with = "null_as_default")]
    pub credit_card_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub credit_card_expiry_date: String,
}

impl Order {
    /// Create an order with just an id and a purchase time.
    pub fn new(id: i64, time: impl Into<String>) -> Self {
        Self {
            id,
            time: time.into(),
            ..Default::default()
        }
    }

    /// The purchase time in epoch milliseconds.
    pub fn millis(&self) -> Result<i64, TimeError> {
        time::parse(&self.time)
    }
}

/// One line item of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderItem {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub product_id: i64,
    pub order_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub quantity: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub unit_price_in_cents: i64,
}

impl OrderItem {
    /// Create an item belonging to the given order.
    pub fn for_order(order_id: i64) -> Self {
        Self {
            order_id,
            ..Default::default()
        }
    }
}

/// The filtered collections handed to the trainer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingSet {
    pub items: Vec<OrderItem>,
    pub orders: Vec<Order>,
}

impl TrainingSet {
    /// Total number of records (items plus orders).
    pub fn len(&self) -> usize {
        self.items.len() + self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.orders.is_empty()
    }
}
