// src/models/order_item.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One line of an order. `price_at_purchase` is the unit price snapshotted
/// when the order was placed; it never changes afterwards, even if the
/// product's listed price does.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: Decimal,
  pub price_at_purchase: Decimal,
  pub created_at: DateTime<Utc>,
}
