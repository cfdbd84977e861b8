// src/services/checkout.rs

//! Order placement orchestration.
//!
//! The sequence: load the cart, validate it, total it, verify the wallet can
//! cover it, settle (order + line items + debit as one transactional unit),
//! then clear the cart. The first failing step aborts the rest; settlement
//! is all-or-nothing, so no failure leaves a half-placed order behind.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cart::CartStore;
use crate::errors::{AppError, Result};
use crate::pricing;
use crate::services::ledger::{Ledger, PlacedOrder};

pub struct CheckoutService {
  ledger: Arc<dyn Ledger>,
  cart: Arc<dyn CartStore>,
}

impl CheckoutService {
  pub fn new(ledger: Arc<dyn Ledger>, cart: Arc<dyn CartStore>) -> Self {
    Self { ledger, cart }
  }

  /// Place an order for everything in the user's cart.
  ///
  /// Fails with `EmptyCart` for an empty cart and `InsufficientFunds` when
  /// the available balance does not cover the total. On success the cart is
  /// cleared and the created order, its line items and the debit transaction
  /// are returned.
  #[instrument(name = "checkout::place_order", skip(self), fields(user_id = %user_id))]
  pub async fn place_order(&self, user_id: Uuid) -> Result<PlacedOrder> {
    let lines = self.cart.load(user_id).await?;
    if lines.is_empty() {
      warn!("Order placement attempted with an empty cart.");
      return Err(AppError::EmptyCart);
    }
    // Ingestion already validates every line; re-checking here keeps a
    // stale or hand-written slot from sneaking a negative price (a wallet
    // credit in disguise) or a non-positive quantity into settlement.
    for line in &lines {
      line.validate()?;
    }

    let total = pricing::cart_total(&lines)?;

    // Read-only sufficiency check before any mutation. Settlement re-checks
    // under the wallet lock, so a concurrent spend between here and there
    // cannot overdraw the wallet.
    let available = self.ledger.balance(user_id).await?;
    if available < total {
      warn!(%available, required = %total, "Order placement rejected: insufficient funds.");
      return Err(AppError::InsufficientFunds {
        available,
        required: total,
      });
    }

    let placed = self.ledger.settle_order(user_id, &lines).await?;

    // The cart is cleared only once settlement is durable; a clear failure
    // leaves a stale cart, never a missing order.
    self.cart.clear(user_id).await?;

    info!(
      order_id = %placed.order.id,
      total = %placed.order.total_price,
      new_balance = %placed.new_balance,
      "Order placed."
    );
    Ok(placed)
  }
}
