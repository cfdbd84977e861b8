// src/services/pg_ledger.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{
  CartLine, Order, OrderItem, OrderStatus, TransactionStatus, TransactionType, Wallet, WalletTransaction,
};
use crate::pricing;
use crate::services::ledger::{ensure_positive_amount, Ledger, PlacedOrder, WalletReceipt};

const WALLET_COLUMNS: &str = "id, user_id, balance, locked_balance, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, user_id, status, total_price, order_date, delivery_date, created_at, updated_at";
const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, price_at_purchase, created_at";
const TXN_COLUMNS: &str = "id, wallet_id, amount, transaction_type, description, reference_id, status, created_at";

/// Postgres-backed [`Ledger`].
///
/// Balance mutations and the settlement unit each run in one database
/// transaction, taking the wallet row with `FOR UPDATE` so concurrent
/// placements against the same wallet serialize instead of racing the
/// sufficiency check.
#[derive(Clone)]
pub struct PgLedger {
  pool: PgPool,
}

impl PgLedger {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Lazy-initialize and lock the wallet row inside `tx`.
  async fn locked_wallet(tx: &mut Transaction<'_, Postgres>, user_id: Uuid) -> Result<Wallet> {
    sqlx::query("INSERT INTO wallets (id, user_id) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING")
      .bind(Uuid::new_v4())
      .bind(user_id)
      .execute(&mut **tx)
      .await?;

    let wallet: Wallet = sqlx::query_as(&format!(
      "SELECT {WALLET_COLUMNS} FROM wallets WHERE user_id = $1 FOR UPDATE"
    ))
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;
    Ok(wallet)
  }

  async fn append_transaction(
    tx: &mut Transaction<'_, Postgres>,
    wallet_id: Uuid,
    amount: Decimal,
    kind: TransactionType,
    description: &str,
    reference_id: Option<Uuid>,
  ) -> Result<WalletTransaction, sqlx::Error> {
    sqlx::query_as(&format!(
      "INSERT INTO wallet_transactions (id, wallet_id, amount, transaction_type, description, reference_id, status) \
       VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {TXN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(wallet_id)
    .bind(amount)
    .bind(kind)
    .bind(description)
    .bind(reference_id)
    .bind(TransactionStatus::Completed)
    .fetch_one(&mut **tx)
    .await
  }
}

#[async_trait]
impl Ledger for PgLedger {
  #[instrument(name = "ledger::wallet", skip(self), fields(user_id = %user_id))]
  async fn wallet(&self, user_id: Uuid) -> Result<Wallet> {
    // Upsert-then-select keeps the lazy initialization race-free: two first
    // accesses both land on the same row.
    sqlx::query("INSERT INTO wallets (id, user_id) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING")
      .bind(Uuid::new_v4())
      .bind(user_id)
      .execute(&self.pool)
      .await?;

    let wallet: Wallet = sqlx::query_as(&format!("SELECT {WALLET_COLUMNS} FROM wallets WHERE user_id = $1"))
      .bind(user_id)
      .fetch_one(&self.pool)
      .await?;
    Ok(wallet)
  }

  #[instrument(name = "ledger::credit", skip(self, description), fields(user_id = %user_id, amount = %amount))]
  async fn credit(&self, user_id: Uuid, amount: Decimal, description: &str) -> Result<WalletReceipt> {
    ensure_positive_amount(amount)?;

    let mut tx = self.pool.begin().await?;
    let wallet = Self::locked_wallet(&mut tx, user_id).await?;

    sqlx::query("UPDATE wallets SET balance = balance + $1, updated_at = now() WHERE id = $2")
      .bind(amount)
      .bind(wallet.id)
      .execute(&mut *tx)
      .await?;
    let txn =
      Self::append_transaction(&mut tx, wallet.id, amount, TransactionType::Credit, description, None).await?;
    tx.commit().await?;

    // Computed from the row held under the lock, not re-read after commit.
    let new_balance = wallet.available_balance() + amount;
    info!(wallet_id = %wallet.id, %new_balance, "Wallet credited.");
    Ok(WalletReceipt {
      transaction: txn,
      new_balance,
    })
  }

  #[instrument(name = "ledger::debit", skip(self, description), fields(user_id = %user_id, amount = %amount))]
  async fn debit(&self, user_id: Uuid, amount: Decimal, description: &str) -> Result<WalletReceipt> {
    ensure_positive_amount(amount)?;

    let mut tx = self.pool.begin().await?;
    let wallet = Self::locked_wallet(&mut tx, user_id).await?;
    if amount > wallet.available_balance() {
      return Err(AppError::InsufficientFunds {
        available: wallet.available_balance(),
        required: amount,
      });
    }

    sqlx::query("UPDATE wallets SET balance = balance - $1, updated_at = now() WHERE id = $2")
      .bind(amount)
      .bind(wallet.id)
      .execute(&mut *tx)
      .await?;
    let txn =
      Self::append_transaction(&mut tx, wallet.id, amount, TransactionType::Debit, description, None).await?;
    tx.commit().await?;

    let new_balance = wallet.available_balance() - amount;
    info!(wallet_id = %wallet.id, %new_balance, "Wallet debited.");
    Ok(WalletReceipt {
      transaction: txn,
      new_balance,
    })
  }

  #[instrument(name = "ledger::settle_order", skip(self, lines), fields(user_id = %user_id, line_count = lines.len()))]
  async fn settle_order(&self, user_id: Uuid, lines: &[CartLine]) -> Result<PlacedOrder> {
    if lines.is_empty() {
      return Err(AppError::EmptyCart);
    }
    let total = pricing::cart_total(lines)?;
    // A zero or negative total must never become a debit, whatever the
    // caller checked upstream.
    ensure_positive_amount(total)?;

    let mut tx = self.pool.begin().await?;
    // The wallet row lock serializes concurrent settlements for the same
    // user; the sufficiency check below cannot be raced past.
    let wallet = Self::locked_wallet(&mut tx, user_id).await?;
    if wallet.available_balance() < total {
      return Err(AppError::InsufficientFunds {
        available: wallet.available_balance(),
        required: total,
      });
    }

    let order: Order = sqlx::query_as(&format!(
      "INSERT INTO orders (id, user_id, status, total_price) VALUES ($1, $2, $3, $4) RETURNING {ORDER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(OrderStatus::Pending)
    .bind(total)
    .fetch_one(&mut *tx)
    .await
    .map_err(|err| AppError::OrderCreation { source: err.into() })?;

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
      let item: OrderItem = sqlx::query_as(&format!(
        "INSERT INTO order_items (id, order_id, product_id, quantity, price_at_purchase) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {ORDER_ITEM_COLUMNS}"
      ))
      .bind(Uuid::new_v4())
      .bind(order.id)
      .bind(line.product_id)
      .bind(line.quantity)
      .bind(line.unit_price)
      .fetch_one(&mut *tx)
      .await
      .map_err(|err| AppError::LineItemCreation { source: err.into() })?;
      items.push(item);
    }

    sqlx::query("UPDATE wallets SET balance = balance - $1, updated_at = now() WHERE id = $2")
      .bind(total)
      .bind(wallet.id)
      .execute(&mut *tx)
      .await
      .map_err(|err| AppError::WalletDebit { source: err.into() })?;
    let debit = Self::append_transaction(
      &mut tx,
      wallet.id,
      total,
      TransactionType::Debit,
      &format!("Order {} settlement", order.id),
      Some(order.id),
    )
    .await
    .map_err(|err| AppError::WalletDebit { source: err.into() })?;

    tx.commit().await?;

    let new_balance = wallet.available_balance() - total;
    info!(order_id = %order.id, total = %total, new_balance = %new_balance, "Order settled.");
    Ok(PlacedOrder {
      order,
      items,
      debit,
      new_balance,
    })
  }

  #[instrument(name = "ledger::orders", skip(self), fields(user_id = %user_id))]
  async fn orders(&self, user_id: Uuid, status: Option<OrderStatus>) -> Result<Vec<Order>> {
    let orders: Vec<Order> = match status {
      Some(status) => {
        sqlx::query_as(&format!(
          "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 AND status = $2 ORDER BY order_date DESC"
        ))
        .bind(user_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?
      }
      None => {
        sqlx::query_as(&format!(
          "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY order_date DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
      }
    };
    Ok(orders)
  }

  #[instrument(name = "ledger::order_items", skip(self), fields(order_id = %order_id))]
  async fn order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
    let items: Vec<OrderItem> = sqlx::query_as(&format!(
      "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY created_at ASC"
    ))
    .bind(order_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(items)
  }

  #[instrument(name = "ledger::transactions", skip(self), fields(user_id = %user_id))]
  async fn transactions(&self, user_id: Uuid) -> Result<Vec<WalletTransaction>> {
    let txns: Vec<WalletTransaction> = sqlx::query_as(
      "SELECT t.id, t.wallet_id, t.amount, t.transaction_type, t.description, t.reference_id, t.status, t.created_at \
       FROM wallet_transactions t JOIN wallets w ON w.id = t.wallet_id \
       WHERE w.user_id = $1 ORDER BY t.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(txns)
  }
}
