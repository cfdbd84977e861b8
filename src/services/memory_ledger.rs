// src/services/memory_ledger.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{
  CartLine, Order, OrderItem, OrderStatus, TransactionStatus, TransactionType, Wallet, WalletTransaction,
};
use crate::pricing;
use crate::services::ledger::{ensure_positive_amount, Ledger, PlacedOrder, WalletReceipt};

/// Which settlement step the next `settle_order` call should fail at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleFailure {
  OrderInsert,
  LineItemInsert,
  WalletDebit,
}

#[derive(Debug, Default)]
struct Inner {
  wallets: HashMap<Uuid, Wallet>,
  transactions: Vec<WalletTransaction>,
  orders: Vec<Order>,
  order_items: Vec<OrderItem>,
}

/// In-process [`Ledger`] used by tests and demos.
///
/// One mutex guards all tables, so every operation is atomic and concurrent
/// settlements serialize the same way the Postgres wallet row lock makes
/// them. `fail_next_settle` injects a one-shot failure at a chosen
/// settlement step; an injected failure leaves no state behind, matching the
/// all-or-nothing contract.
#[derive(Debug, Default)]
pub struct MemoryLedger {
  inner: Mutex<Inner>,
  fail_next_settle: Mutex<Option<SettleFailure>>,
}

impl MemoryLedger {
  pub fn new() -> Self {
    Self::default()
  }

  /// Arrange for the next `settle_order` to fail at `step`.
  pub fn fail_next_settle(&self, step: SettleFailure) {
    *self.fail_next_settle.lock() = Some(step);
  }

  fn wallet_entry(inner: &mut Inner, user_id: Uuid) -> &mut Wallet {
    inner.wallets.entry(user_id).or_insert_with(|| {
      let now = Utc::now();
      Wallet {
        id: Uuid::new_v4(),
        user_id,
        balance: Decimal::ZERO,
        locked_balance: Decimal::ZERO,
        created_at: now,
        updated_at: now,
      }
    })
  }

  fn transaction(
    wallet_id: Uuid,
    amount: Decimal,
    kind: TransactionType,
    description: &str,
    reference_id: Option<Uuid>,
  ) -> WalletTransaction {
    WalletTransaction {
      id: Uuid::new_v4(),
      wallet_id,
      amount,
      transaction_type: kind,
      description: Some(description.to_string()),
      reference_id,
      status: TransactionStatus::Completed,
      created_at: Utc::now(),
    }
  }
}

#[async_trait]
impl Ledger for MemoryLedger {
  async fn wallet(&self, user_id: Uuid) -> Result<Wallet> {
    let mut inner = self.inner.lock();
    Ok(Self::wallet_entry(&mut inner, user_id).clone())
  }

  async fn credit(&self, user_id: Uuid, amount: Decimal, description: &str) -> Result<WalletReceipt> {
    ensure_positive_amount(amount)?;
    let mut inner = self.inner.lock();
    let wallet = Self::wallet_entry(&mut inner, user_id);
    wallet.balance += amount;
    wallet.updated_at = Utc::now();
    let new_balance = wallet.available_balance();
    let txn = Self::transaction(wallet.id, amount, TransactionType::Credit, description, None);
    inner.transactions.push(txn.clone());
    Ok(WalletReceipt {
      transaction: txn,
      new_balance,
    })
  }

  async fn debit(&self, user_id: Uuid, amount: Decimal, description: &str) -> Result<WalletReceipt> {
    ensure_positive_amount(amount)?;
    let mut inner = self.inner.lock();
    let wallet = Self::wallet_entry(&mut inner, user_id);
    if amount > wallet.available_balance() {
      return Err(AppError::InsufficientFunds {
        available: wallet.available_balance(),
        required: amount,
      });
    }
    wallet.balance -= amount;
    wallet.updated_at = Utc::now();
    let new_balance = wallet.available_balance();
    let txn = Self::transaction(wallet.id, amount, TransactionType::Debit, description, None);
    inner.transactions.push(txn.clone());
    Ok(WalletReceipt {
      transaction: txn,
      new_balance,
    })
  }

  async fn settle_order(&self, user_id: Uuid, lines: &[CartLine]) -> Result<PlacedOrder> {
    if lines.is_empty() {
      return Err(AppError::EmptyCart);
    }
    let total = pricing::cart_total(lines)?;
    ensure_positive_amount(total)?;
    let injected = self.fail_next_settle.lock().take();

    let mut inner = self.inner.lock();
    let wallet = Self::wallet_entry(&mut inner, user_id).clone();
    if wallet.available_balance() < total {
      return Err(AppError::InsufficientFunds {
        available: wallet.available_balance(),
        required: total,
      });
    }

    // Build every row on the side first; nothing lands in the tables until
    // all steps have passed, which is what the database transaction
    // guarantees in the Postgres implementation.
    if injected == Some(SettleFailure::OrderInsert) {
      return Err(AppError::OrderCreation {
        source: anyhow::anyhow!("injected order insert failure"),
      });
    }
    let now = Utc::now();
    let order = Order {
      id: Uuid::new_v4(),
      user_id,
      status: OrderStatus::Pending,
      total_price: total,
      order_date: now,
      delivery_date: None,
      created_at: now,
      updated_at: now,
    };

    if injected == Some(SettleFailure::LineItemInsert) {
      return Err(AppError::LineItemCreation {
        source: anyhow::anyhow!("injected line item insert failure"),
      });
    }
    let items: Vec<OrderItem> = lines
      .iter()
      .map(|line| OrderItem {
        id: Uuid::new_v4(),
        order_id: order.id,
        product_id: line.product_id,
        quantity: line.quantity,
        price_at_purchase: line.unit_price,
        created_at: now,
      })
      .collect();

    if injected == Some(SettleFailure::WalletDebit) {
      return Err(AppError::WalletDebit {
        source: anyhow::anyhow!("injected wallet debit failure"),
      });
    }
    let debit = Self::transaction(
      wallet.id,
      total,
      TransactionType::Debit,
      &format!("Order {} settlement", order.id),
      Some(order.id),
    );

    let stored_wallet = Self::wallet_entry(&mut inner, user_id);
    stored_wallet.balance -= total;
    stored_wallet.updated_at = now;
    let new_balance = stored_wallet.available_balance();
    inner.orders.push(order.clone());
    inner.order_items.extend(items.iter().cloned());
    inner.transactions.push(debit.clone());

    info!(order_id = %order.id, total = %total, "Order settled in memory ledger.");
    Ok(PlacedOrder {
      order,
      items,
      debit,
      new_balance,
    })
  }

  async fn orders(&self, user_id: Uuid, status: Option<OrderStatus>) -> Result<Vec<Order>> {
    let inner = self.inner.lock();
    let mut orders: Vec<Order> = inner
      .orders
      .iter()
      .filter(|order| order.user_id == user_id && status.map_or(true, |s| order.status == s))
      .cloned()
      .collect();
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
    Ok(orders)
  }

  async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
    let inner = self.inner.lock();
    Ok(
      inner
        .order_items
        .iter()
        .filter(|item| item.order_id == order_id)
        .cloned()
        .collect(),
    )
  }

  async fn transactions(&self, user_id: Uuid) -> Result<Vec<WalletTransaction>> {
    let inner = self.inner.lock();
    let wallet_id = match inner.wallets.get(&user_id) {
      Some(wallet) => wallet.id,
      None => return Ok(Vec::new()),
    };
    let mut txns: Vec<WalletTransaction> = inner
      .transactions
      .iter()
      .filter(|txn| txn.wallet_id == wallet_id)
      .cloned()
      .collect();
    txns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(txns)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn first_access_lazily_creates_a_zero_balance_wallet() {
    let ledger = MemoryLedger::new();
    let user = Uuid::new_v4();
    let wallet = ledger.wallet(user).await.unwrap();
    assert_eq!(wallet.balance, Decimal::ZERO);
    assert_eq!(wallet.locked_balance, Decimal::ZERO);
    // Second access returns the same wallet, not a new one.
    assert_eq!(ledger.wallet(user).await.unwrap().id, wallet.id);
  }

  #[tokio::test]
  async fn credit_rejects_non_positive_amounts_and_leaves_balance_unchanged() {
    let ledger = MemoryLedger::new();
    let user = Uuid::new_v4();
    let err = ledger.credit(user, Decimal::from(-5), "bad").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));
    assert_eq!(ledger.balance(user).await.unwrap(), Decimal::ZERO);
    assert!(ledger.transactions(user).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn debit_beyond_balance_fails_with_insufficient_funds() {
    let ledger = MemoryLedger::new();
    let user = Uuid::new_v4();
    ledger.credit(user, Decimal::from(100), "top up").await.unwrap();
    let err = ledger.debit(user, Decimal::from(150), "too much").await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds { .. }));
    assert_eq!(ledger.balance(user).await.unwrap(), Decimal::from(100));
  }

  fn line(name: &str, price: &str, quantity: &str) -> CartLine {
    CartLine {
      product_id: Uuid::new_v4(),
      name: name.to_string(),
      unit_price: price.parse().unwrap(),
      quantity: quantity.parse().unwrap(),
      unit: "tons".to_string(),
      farmer_id: None,
      farmer_name: None,
      image: None,
    }
  }

  #[tokio::test]
  async fn receipts_carry_the_balance_their_own_mutation_produced() {
    let ledger = MemoryLedger::new();
    let user = Uuid::new_v4();
    let first = ledger.credit(user, Decimal::from(100), "top up").await.unwrap();
    assert_eq!(first.new_balance, Decimal::from(100));
    let second = ledger.credit(user, Decimal::from(50), "top up again").await.unwrap();
    assert_eq!(second.new_balance, Decimal::from(150));
    let spent = ledger.debit(user, Decimal::from(30), "spend").await.unwrap();
    assert_eq!(spent.new_balance, Decimal::from(120));
    assert_eq!(ledger.balance(user).await.unwrap(), Decimal::from(120));
  }

  #[tokio::test]
  async fn settlement_rejects_empty_and_zero_total_carts_at_the_ledger() {
    let ledger = MemoryLedger::new();
    let user = Uuid::new_v4();
    ledger.credit(user, Decimal::from(500), "top up").await.unwrap();

    let err = ledger.settle_order(user, &[]).await.unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));

    let free = vec![line("Unpriced Maize", "0", "2")];
    let err = ledger.settle_order(user, &free).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));

    assert_eq!(ledger.balance(user).await.unwrap(), Decimal::from(500));
    assert!(ledger.orders(user, None).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn credit_then_debit_appends_one_transaction_each() {
    let ledger = MemoryLedger::new();
    let user = Uuid::new_v4();
    ledger.credit(user, Decimal::from(500), "add money").await.unwrap();
    ledger.debit(user, Decimal::from(200), "spend").await.unwrap();
    assert_eq!(ledger.balance(user).await.unwrap(), Decimal::from(300));
    let txns = ledger.transactions(user).await.unwrap();
    assert_eq!(txns.len(), 2);
  }
}
