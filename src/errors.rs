// src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

/// Application error taxonomy.
///
/// The order-placement outcomes (`EmptyCart`, `InsufficientFunds`,
/// `InvalidAmount`, and the three settlement step failures) surface to the
/// client as short messages; none are retried automatically. Everything is
/// traced when turned into a response.
#[derive(Debug, Error)]
pub enum AppError {
  #[error("Cart is empty; nothing to order")]
  EmptyCart,

  #[error("Insufficient wallet balance: available {available}, required {required}")]
  InsufficientFunds { available: Decimal, required: Decimal },

  #[error("Invalid amount {0}: must be greater than zero")]
  InvalidAmount(Decimal),

  #[error("Could not create the order record: {source}")]
  OrderCreation {
    #[source]
    source: anyhow::Error,
  },

  #[error("Could not record the order line items: {source}")]
  LineItemCreation {
    #[source]
    source: anyhow::Error,
  },

  #[error("Could not debit the wallet: {source}")]
  WalletDebit {
    #[source]
    source: anyhow::Error,
  },

  #[error("Cart storage error: {source}")]
  CartStorage {
    #[source]
    source: anyhow::Error,
  },

  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience
// in handlers that use `?` on functions returning anyhow::Result.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    if err.is::<sqlx::Error>() {
      // We already have `From<sqlx::Error>`; this handles a wrapped one.
      match err.downcast::<sqlx::Error>() {
        Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
        Err(original) => AppError::Internal(original.to_string()),
      }
    } else {
      AppError::Internal(err.to_string())
    }
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::EmptyCart => HttpResponse::BadRequest().json(json!({"error": self.to_string()})),
      AppError::InsufficientFunds { available, required } => HttpResponse::PaymentRequired().json(json!({
        "error": "Insufficient wallet balance",
        "available": available,
        "required": required,
      })),
      AppError::InvalidAmount(_) => HttpResponse::BadRequest().json(json!({"error": self.to_string()})),
      AppError::OrderCreation { .. } | AppError::LineItemCreation { .. } | AppError::WalletDebit { .. } => {
        HttpResponse::InternalServerError().json(json!({"error": "Order placement failed", "detail": self.to_string()}))
      }
      AppError::CartStorage { source } => {
        HttpResponse::InternalServerError().json(json!({"error": "Cart storage failed", "detail": source.to_string()}))
      }
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Sqlx(_) => HttpResponse::InternalServerError().json(json!({"error": "Database operation failed"})),
      AppError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
