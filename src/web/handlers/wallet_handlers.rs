// src/web/handlers/wallet_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct AddMoneyRequestPayload {
  pub amount: Decimal,
  #[serde(default)]
  pub description: Option<String>,
}

/// Balance view. First access creates the wallet with a zero balance.
#[instrument(name = "handler::get_wallet", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_wallet_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let wallet = app_state.ledger.wallet(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({
    "balance": wallet.available_balance(),
    "lockedBalance": wallet.locked_balance,
    "total": wallet.balance + wallet.locked_balance,
  })))
}

#[instrument(
  name = "handler::add_money",
  skip(app_state, req_payload, auth_user),
  fields(user_id = %auth_user.user_id, amount = %req_payload.amount)
)]
pub async fn add_money_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddMoneyRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let description = req_payload
    .description
    .clone()
    .unwrap_or_else(|| "Wallet top-up".to_string());
  let receipt = app_state
    .ledger
    .credit(auth_user.user_id, req_payload.amount, &description)
    .await?;

  // The receipt's balance belongs to this credit; a fresh read here could
  // reflect a concurrent spend instead.
  info!(transaction_id = %receipt.transaction.id, "Wallet credited.");
  Ok(HttpResponse::Ok().json(json!({
    "message": "Money added to wallet.",
    "transaction": receipt.transaction,
    "balance": receipt.new_balance,
  })))
}

#[instrument(name = "handler::list_wallet_transactions", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_transactions_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let txns = app_state.ledger.transactions(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "transactions": txns })))
}
