// src/models/wallet.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

/// A per-user stored balance, the sole payment mechanism for placing orders.
///
/// `locked_balance` is money reserved against the wallet that is NOT
/// available for new orders. Lock management happens outside this service;
/// here the field is only stored, reported, and excluded from availability.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Wallet {
  pub id: Uuid,
  pub user_id: Uuid,
  pub balance: Decimal,
  pub locked_balance: Decimal,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Wallet {
  /// Funds usable for a new order. Locked funds never count.
  pub fn available_balance(&self) -> Decimal {
    self.balance
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "transaction_type_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
  Credit,
  Debit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "transaction_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
  Pending,
  Completed,
  Failed,
}

/// One row of the append-only wallet audit trail. Never mutated after
/// creation; `reference_id` points at the order for settlement debits.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct WalletTransaction {
  pub id: Uuid,
  pub wallet_id: Uuid,
  pub amount: Decimal,
  pub transaction_type: TransactionType,
  pub description: Option<String>,
  pub reference_id: Option<Uuid>,
  pub status: TransactionStatus,
  pub created_at: DateTime<Utc>,
}
