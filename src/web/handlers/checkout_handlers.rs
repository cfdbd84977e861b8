// src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

/// Place an order for the caller's whole cart.
///
/// Terminal outcomes map to the error taxonomy: an empty cart and invalid
/// quantities come back as 400, an underfunded wallet as 402, settlement
/// storage failures as 500. On success the cart has been cleared.
#[instrument(name = "handler::place_order", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let placed = app_state.checkout.place_order(auth_user.user_id).await?;

  info!(order_id = %placed.order.id, "Checkout completed.");
  Ok(HttpResponse::Created().json(json!({
    "message": "Order placed successfully.",
    "order": placed.order,
    "items": placed.items,
    "walletBalance": placed.new_balance,
    "transaction": placed.debit,
  })))
}
