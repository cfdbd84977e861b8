// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A crop listed by a farmer. `price` is per ton; `quantity_tons` is the
/// amount currently offered.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub unit: String,
  pub quantity_tons: Decimal,
  pub farmer_id: Option<Uuid>,
  pub in_stock: bool,
  pub organic: bool,
  pub image: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A product row joined with its farmer's public details, as the merchant
/// catalog presents it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductWithFarmer {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub price: Decimal,
  pub unit: String,
  pub quantity_tons: Decimal,
  pub farmer_id: Option<Uuid>,
  pub in_stock: bool,
  pub organic: bool,
  pub image: Option<String>,
  pub farmer_name: Option<String>,
  pub farmer_location: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
