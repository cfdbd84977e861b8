// src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Delivered,
  Cancelled,
}

/// The durable record of a completed purchase. Created once by order
/// settlement together with its line items; later status transitions are
/// fulfilment's business, not this service's.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub status: OrderStatus,
  pub total_price: Decimal,
  pub order_date: DateTime<Utc>,
  pub delivery_date: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
