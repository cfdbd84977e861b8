// src/services/ledger.rs

//! The wallet ledger storage seam.
//!
//! One trait covers the durable state the order flow touches: wallets, the
//! append-only transaction trail, orders and their line items. The Postgres
//! implementation is the production backend; the in-memory one stands in for
//! it in tests and demos.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{CartLine, Order, OrderItem, OrderStatus, Wallet, WalletTransaction};

/// Everything a successful settlement produced, returned in one piece so
/// callers never re-query for the rows they just created.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
  pub order: Order,
  pub items: Vec<OrderItem>,
  pub debit: WalletTransaction,
  pub new_balance: Decimal,
}

/// Result of a single credit or debit: the appended transaction row and the
/// balance as of that transaction. The balance comes from inside the same
/// atomic update, so it cannot be skewed by a concurrent spend the way a
/// separate read-after-commit could be.
#[derive(Debug, Clone)]
pub struct WalletReceipt {
  pub transaction: WalletTransaction,
  pub new_balance: Decimal,
}

#[async_trait]
pub trait Ledger: Send + Sync {
  /// Wallet record for the user.
  ///
  /// Lazily initialized: if no wallet exists yet, a zero-balance one is
  /// created first. This read therefore has a side effect on first access.
  async fn wallet(&self, user_id: Uuid) -> Result<Wallet>;

  /// Balance available for new orders. Locked funds are excluded. Lazily
  /// initializes the wallet like [`Ledger::wallet`].
  async fn balance(&self, user_id: Uuid) -> Result<Decimal> {
    Ok(self.wallet(user_id).await?.available_balance())
  }

  /// Add money to the wallet. Fails with `InvalidAmount` unless
  /// `amount > 0`. The balance update and the appended transaction row are
  /// one atomic unit, and the receipt carries the balance they produced.
  async fn credit(&self, user_id: Uuid, amount: Decimal, description: &str) -> Result<WalletReceipt>;

  /// Take money out of the wallet. Fails with `InvalidAmount` unless
  /// `amount > 0`, and with `InsufficientFunds` when the available balance
  /// does not cover it.
  async fn debit(&self, user_id: Uuid, amount: Decimal, description: &str) -> Result<WalletReceipt>;

  /// The settlement unit of order placement: re-check the balance, create
  /// the order, its line items (snapshotting each line's unit price), debit
  /// the wallet and append the debit transaction — all inside a single
  /// transaction with the wallet held, so no partial state is ever visible
  /// and two concurrent placements cannot both spend the same funds.
  ///
  /// `lines` must be non-empty and total to a positive amount; the ledger
  /// enforces both even when the caller has already checked, since a debit
  /// of zero (or a credit smuggled in as a negative total) must never reach
  /// the wallet through this seam.
  async fn settle_order(&self, user_id: Uuid, lines: &[CartLine]) -> Result<PlacedOrder>;

  /// The user's orders, newest first, optionally filtered by status.
  async fn orders(&self, user_id: Uuid, status: Option<OrderStatus>) -> Result<Vec<Order>>;

  /// Line items of one order.
  async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>>;

  /// The user's wallet transaction trail, newest first.
  async fn transactions(&self, user_id: Uuid) -> Result<Vec<WalletTransaction>>;
}

/// Guard shared by credit and debit: ledger amounts must be strictly positive.
pub fn ensure_positive_amount(amount: Decimal) -> Result<()> {
  if amount > Decimal::ZERO {
    Ok(())
  } else {
    Err(AppError::InvalidAmount(amount))
  }
}
