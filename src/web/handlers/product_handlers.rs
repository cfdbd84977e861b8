// src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Farmer, Product, ProductWithFarmer};
use crate::pricing;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

const PRODUCT_FARMER_SELECT: &str = "SELECT p.id, p.name, p.description, p.price, p.unit, p.quantity_tons, \
   p.farmer_id, p.in_stock, p.organic, p.image, f.name AS farmer_name, f.location AS farmer_location, \
   p.created_at, p.updated_at \
   FROM products p LEFT JOIN farmers f ON f.id = p.farmer_id";

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let products: Vec<ProductWithFarmer> =
    sqlx::query_as(&format!("{PRODUCT_FARMER_SELECT} WHERE p.in_stock ORDER BY p.name ASC"))
      .fetch_all(&app_state.db_pool)
      .await
      .map_err(|e| {
        error!("Failed to fetch products from database: {}", e);
        AppError::Sqlx(e)
      })?;

  info!("Fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::get_product", skip(app_state, path))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let product: Option<ProductWithFarmer> = sqlx::query_as(&format!("{PRODUCT_FARMER_SELECT} WHERE p.id = $1"))
    .bind(product_id)
    .fetch_optional(&app_state.db_pool)
    .await?;

  match product {
    Some(product) => Ok(HttpResponse::Ok().json(json!({ "product": product }))),
    None => {
      warn!("Product with ID {} not found.", product_id);
      Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)))
    }
  }
}

/// Crop upload payload as farmers submit it: price and quantity arrive as
/// display strings (`"₹25/kg"`, `"500kg"`).
#[derive(Deserialize, Debug)]
pub struct UploadCropPayload {
  pub name: String,
  pub price: String,
  pub quantity: String,
  #[serde(default)]
  pub quality: Option<String>,
  #[serde(default)]
  pub image: Option<String>,
}

#[instrument(
  name = "handler::upload_crop",
  skip(app_state, req_payload, auth_user),
  fields(farmer_user_id = %auth_user.user_id, crop = %req_payload.name)
)]
pub async fn upload_crop_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<UploadCropPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let price = pricing::parse_price_text(&req_payload.price);
  if price <= Decimal::ZERO {
    return Err(AppError::Validation(format!(
      "Could not read a positive price from '{}'.",
      req_payload.price
    )));
  }
  // Quantities are entered in kilograms; products are listed in tons.
  let quantity_kg = pricing::parse_price_text(&req_payload.quantity);
  let quantity_tons = quantity_kg / Decimal::from(1000);
  let organic = req_payload
    .quality
    .as_deref()
    .map(|q| q.to_lowercase().contains("organic"))
    .unwrap_or(false);

  let farmer: Option<Farmer> =
    sqlx::query_as("SELECT id, user_id, name, location, created_at, updated_at FROM farmers WHERE user_id = $1")
      .bind(auth_user.user_id)
      .fetch_optional(&app_state.db_pool)
      .await?;
  let farmer_id = farmer.map(|f| f.id);

  let product: Product = sqlx::query_as(
    "INSERT INTO products (id, name, description, price, unit, quantity_tons, farmer_id, in_stock, organic, image) \
     VALUES ($1, $2, $3, $4, 'kg', $5, $6, true, $7, $8) \
     RETURNING id, name, description, price, unit, quantity_tons, farmer_id, in_stock, organic, image, created_at, updated_at",
  )
  .bind(Uuid::new_v4())
  .bind(&req_payload.name)
  .bind(req_payload.quality.as_deref())
  .bind(price)
  .bind(quantity_tons)
  .bind(farmer_id)
  .bind(organic)
  .bind(req_payload.image.as_deref())
  .fetch_one(&app_state.db_pool)
  .await?;

  info!(product_id = %product.id, "Crop listed.");
  Ok(HttpResponse::Created().json(json!({
    "message": "Crop listed successfully.",
    "product": product,
  })))
}
