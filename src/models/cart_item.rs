// src/models/cart_item.rs

//! Cart item shapes. Items arrive from clients in the loose historical shape
//! (alternate field names, currency-formatted price strings) and are
//! normalized exactly once, at ingestion, into the canonical [`CartLine`]
//! that the rest of the service works with.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::pricing;

/// A price as clients send it: either a plain number or a currency-formatted
/// string such as `"₹25/kg"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceField {
  Number(Decimal),
  Text(String),
}

impl PriceField {
  pub fn as_decimal(&self) -> Decimal {
    match self {
      PriceField::Number(value) => *value,
      PriceField::Text(raw) => pricing::parse_price_text(raw),
    }
  }
}

/// The loose, client-facing cart item payload. Price may appear under
/// `price_per_ton` or `price`; quantity under `quantity_tons` or `quantity`.
/// Nothing downstream of [`RawCartItem::normalize`] sees these alternatives.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCartItem {
  /// Product id; unique within a cart.
  pub id: Uuid,
  pub name: String,
  #[serde(default)]
  pub price: Option<PriceField>,
  #[serde(default)]
  pub price_per_ton: Option<PriceField>,
  #[serde(default)]
  pub quantity: Option<Decimal>,
  #[serde(default)]
  pub quantity_tons: Option<Decimal>,
  #[serde(default)]
  pub unit: Option<String>,
  #[serde(default)]
  pub farmer_id: Option<Uuid>,
  #[serde(default)]
  pub farmer_name: Option<String>,
  #[serde(default)]
  pub image: Option<String>,
}

impl RawCartItem {
  /// Collapse the alternate field names into one canonical line.
  ///
  /// `price_per_ton` wins over `price`; `quantity_tons` wins over
  /// `quantity`; a missing quantity defaults to 1. A price that parses to
  /// nothing contributes 0.
  pub fn normalize(&self) -> CartLine {
    let unit_price = self
      .price_per_ton
      .as_ref()
      .or(self.price.as_ref())
      .map_or(Decimal::ZERO, PriceField::as_decimal);
    let quantity = self.quantity_tons.or(self.quantity).unwrap_or(Decimal::ONE);

    CartLine {
      product_id: self.id,
      name: self.name.clone(),
      unit_price,
      quantity,
      unit: self.unit.clone().unwrap_or_else(|| "tons".to_string()),
      farmer_id: self.farmer_id,
      farmer_name: self.farmer_name.clone(),
      image: self.image.clone(),
    }
  }
}

/// The canonical, fully-resolved cart line persisted by the cart store and
/// consumed by pricing and order placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
  pub product_id: Uuid,
  pub name: String,
  pub unit_price: Decimal,
  pub quantity: Decimal,
  pub unit: String,
  pub farmer_id: Option<Uuid>,
  pub farmer_name: Option<String>,
  pub image: Option<String>,
}

impl CartLine {
  /// Largest unit price the ledger stores, matching its NUMERIC(14, 2)
  /// price columns: 999,999,999,999.99.
  pub fn max_unit_price() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
  }

  /// Largest quantity the ledger stores, matching its NUMERIC(14, 4)
  /// quantity column: 9,999,999,999.9999.
  pub fn max_quantity() -> Decimal {
    Decimal::new(99_999_999_999_999, 4)
  }

  /// A line is orderable only with a non-negative, in-range unit price and
  /// a positive, in-range quantity. A negative price would turn settlement's
  /// wallet debit into a credit; an out-of-range value would overflow the
  /// total or be rejected by the ledger columns.
  pub fn validate(&self) -> Result<(), AppError> {
    if self.unit_price < Decimal::ZERO {
      return Err(AppError::Validation(format!(
        "Price for '{}' cannot be negative.",
        self.name
      )));
    }
    if self.unit_price > Self::max_unit_price() {
      return Err(AppError::Validation(format!(
        "Price for '{}' exceeds the supported range.",
        self.name
      )));
    }
    if self.quantity <= Decimal::ZERO {
      return Err(AppError::Validation(format!(
        "Quantity for '{}' must be positive.",
        self.name
      )));
    }
    if self.quantity > Self::max_quantity() {
      return Err(AppError::Validation(format!(
        "Quantity for '{}' exceeds the supported range.",
        self.name
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn raw(value: serde_json::Value) -> RawCartItem {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn normalize_prefers_bulk_price_and_quantity() {
    let item = raw(json!({
      "id": "a6f1e5c0-0000-4000-8000-000000000001",
      "name": "Wheat",
      "price": 99,
      "price_per_ton": "₹25/kg",
      "quantity": 3,
      "quantity_tons": 2
    }));
    let line = item.normalize();
    assert_eq!(line.unit_price, Decimal::from(25));
    assert_eq!(line.quantity, Decimal::from(2));
  }

  #[test]
  fn normalize_falls_back_to_generic_fields() {
    let item = raw(json!({
      "id": "a6f1e5c0-0000-4000-8000-000000000002",
      "name": "Rice",
      "price": "30",
      "quantity": 4
    }));
    let line = item.normalize();
    assert_eq!(line.unit_price, Decimal::from(30));
    assert_eq!(line.quantity, Decimal::from(4));
  }

  #[test]
  fn normalize_defaults_missing_quantity_to_one() {
    let item = raw(json!({
      "id": "a6f1e5c0-0000-4000-8000-000000000003",
      "name": "Maize",
      "price": 200
    }));
    let line = item.normalize();
    assert_eq!(line.quantity, Decimal::ONE);
    assert_eq!(line.unit, "tons");
  }

  #[test]
  fn validate_rejects_negative_prices() {
    let item = raw(json!({
      "id": "a6f1e5c0-0000-4000-8000-000000000005",
      "name": "Wheat",
      "price": -500,
      "quantity": 1
    }));
    let line = item.normalize();
    assert_eq!(line.unit_price, Decimal::from(-500));
    assert!(line.validate().is_err());
  }

  #[test]
  fn validate_rejects_values_beyond_ledger_column_ranges() {
    let mut line = raw(json!({
      "id": "a6f1e5c0-0000-4000-8000-000000000006",
      "name": "Rice",
      "price": "7922816251426433759354395033",
      "quantity": 1
    }))
    .normalize();
    assert!(line.validate().is_err());

    line.unit_price = Decimal::from(100);
    line.quantity = CartLine::max_quantity() + Decimal::ONE;
    assert!(line.validate().is_err());

    line.quantity = Decimal::from(100);
    assert!(line.validate().is_ok());
  }

  #[test]
  fn validate_accepts_zero_priced_lines() {
    // Malformed prices normalize to 0 and stay orderable; only negative
    // and oversized values are refused.
    let line = raw(json!({
      "id": "a6f1e5c0-0000-4000-8000-000000000007",
      "name": "Mystery Crop",
      "price": "N/A",
      "quantity": 2
    }))
    .normalize();
    assert!(line.validate().is_ok());
  }

  #[test]
  fn normalize_treats_malformed_price_as_zero() {
    let item = raw(json!({
      "id": "a6f1e5c0-0000-4000-8000-000000000004",
      "name": "Mystery Crop",
      "price": "N/A",
      "quantity": 5
    }));
    assert_eq!(item.normalize().unit_price, Decimal::ZERO);
  }
}
