// src/pricing.rs

//! Cart price aggregation.
//!
//! Prices reach us in whatever shape the client had on hand, frequently a
//! display string like `"₹25/kg"`. Parsing strips everything that is not a
//! digit or a decimal point; a string with nothing parseable left is worth 0.
//! All arithmetic is `rust_decimal::Decimal`, so summing many lines cannot
//! accumulate binary floating-point error.

use rust_decimal::Decimal;

use crate::errors::{AppError, Result};
use crate::models::CartLine;

/// Extract a decimal amount from a currency-formatted string.
///
/// `"₹25/kg"` parses to 25, `"30"` to 30, `"N/A"` to 0.
pub fn parse_price_text(raw: &str) -> Decimal {
  let cleaned: String = raw
    .chars()
    .filter(|c| c.is_ascii_digit() || *c == '.')
    .collect();
  cleaned.parse().unwrap_or(Decimal::ZERO)
}

/// Total of `unit_price * quantity` across the cart, in input order.
/// An empty cart totals exactly 0.
///
/// Arithmetic is checked: values large enough to overflow `Decimal` come
/// back as a `Validation` error instead of panicking inside a request.
pub fn cart_total(lines: &[CartLine]) -> Result<Decimal> {
  let mut total = Decimal::ZERO;
  for line in lines {
    total = line
      .unit_price
      .checked_mul(line.quantity)
      .and_then(|line_total| total.checked_add(line_total))
      .ok_or_else(|| AppError::Validation(format!("Cart total overflows at '{}'.", line.name)))?;
  }
  Ok(total)
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  fn line(unit_price: Decimal, quantity: Decimal) -> CartLine {
    CartLine {
      product_id: Uuid::new_v4(),
      name: "Wheat".to_string(),
      unit_price,
      quantity,
      unit: "tons".to_string(),
      farmer_id: None,
      farmer_name: None,
      image: None,
    }
  }

  #[test]
  fn parses_currency_formatted_strings() {
    assert_eq!(parse_price_text("₹25/kg"), Decimal::from(25));
    assert_eq!(parse_price_text("30"), Decimal::from(30));
    assert_eq!(parse_price_text("₹1,250.50"), "1250.50".parse::<Decimal>().unwrap());
  }

  #[test]
  fn malformed_price_parses_to_zero() {
    assert_eq!(parse_price_text("N/A"), Decimal::ZERO);
    assert_eq!(parse_price_text(""), Decimal::ZERO);
    assert_eq!(parse_price_text("free!"), Decimal::ZERO);
  }

  #[test]
  fn empty_cart_totals_zero() {
    assert_eq!(cart_total(&[]).unwrap(), Decimal::ZERO);
  }

  #[test]
  fn totals_price_times_quantity_across_lines() {
    let lines = vec![
      line(Decimal::from(200), Decimal::from(1)),
      line(Decimal::from(25), Decimal::from(8)),
    ];
    assert_eq!(cart_total(&lines).unwrap(), Decimal::from(400));
  }

  #[test]
  fn fractional_quantities_keep_decimal_precision() {
    let lines = vec![line("25.50".parse().unwrap(), "0.4".parse().unwrap())];
    assert_eq!(cart_total(&lines).unwrap(), "10.200".parse::<Decimal>().unwrap());
  }

  #[test]
  fn overflowing_totals_error_instead_of_panicking() {
    let lines = vec![line(Decimal::MAX, Decimal::from(100))];
    assert!(matches!(cart_total(&lines), Err(AppError::Validation(_))));

    // Overflow in the running sum, not just a single multiplication.
    let lines = vec![line(Decimal::MAX, Decimal::ONE), line(Decimal::MAX, Decimal::ONE)];
    assert!(matches!(cart_total(&lines), Err(AppError::Validation(_))));
  }
}
