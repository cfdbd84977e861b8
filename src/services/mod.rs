// src/services/mod.rs

//! Business services: the wallet ledger seam with its two backends, and the
//! order placement orchestrator built on top of it.

pub mod checkout;
pub mod ledger;
pub mod memory_ledger;
pub mod pg_ledger;

pub use checkout::CheckoutService;
pub use ledger::{Ledger, PlacedOrder, WalletReceipt};
pub use memory_ledger::{MemoryLedger, SettleFailure};
pub use pg_ledger::PgLedger;
