// src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::OrderStatus;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct ListOrdersQuery {
  pub status: Option<OrderStatus>,
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user, query), fields(user_id = %auth_user.user_id, status = ?query.status))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  query: web::Query<ListOrdersQuery>,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.ledger.orders(auth_user.user_id, query.status).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::get_order", skip(app_state, auth_user, path), fields(user_id = %auth_user.user_id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let orders = app_state.ledger.orders(auth_user.user_id, None).await?;
  let order = orders
    .into_iter()
    .find(|order| order.id == order_id)
    .ok_or_else(|| AppError::NotFound(format!("Order with ID {} not found.", order_id)))?;
  let items = app_state.ledger.order_items(order.id).await?;

  Ok(HttpResponse::Ok().json(json!({
    "order": order,
    "items": items,
  })))
}
