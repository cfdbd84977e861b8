// src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::models::RawCartItem;
use crate::pricing;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::view_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn view_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let lines = app_state.cart.load(auth_user.user_id).await?;
  let total = pricing::cart_total(&lines)?;
  Ok(HttpResponse::Ok().json(json!({
    "items": lines,
    "total": total,
  })))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, req_payload, auth_user),
  fields(user_id = %auth_user.user_id, product_id = %req_payload.id)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RawCartItem>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  // Normalization happens here, once; everything downstream works with the
  // canonical line shape. Validation rejects negative or out-of-range
  // prices and non-positive quantities before they can reach settlement.
  let line = req_payload.normalize();
  if let Err(err) = line.validate() {
    warn!(unit_price = %line.unit_price, quantity = %line.quantity, "Rejected cart add: {err}");
    return Err(err);
  }

  let lines = app_state.cart.add(auth_user.user_id, line).await?;
  let total = pricing::cart_total(&lines)?;
  info!(line_count = lines.len(), "Item added to cart.");
  Ok(HttpResponse::Ok().json(json!({
    "message": "Item added to cart successfully.",
    "items": lines,
    "total": total,
  })))
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  app_state.cart.clear(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Cart cleared." })))
}
