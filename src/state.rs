// src/state.rs

use std::sync::Arc;

use sqlx::PgPool;

use crate::cart::CartStore;
use crate::config::AppConfig;
use crate::services::{CheckoutService, Ledger};

#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub ledger: Arc<dyn Ledger>,
  pub cart: Arc<dyn CartStore>,
  pub checkout: Arc<CheckoutService>,
  pub config: Arc<AppConfig>,
}
