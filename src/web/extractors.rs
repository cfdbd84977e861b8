// src/web/extractors.rs

use actix_web::{FromRequest, HttpRequest};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;

/// The caller's identity, taken from the `X-User-ID` header.
///
/// Authentication itself is delegated to the external identity provider in
/// front of this service; by the time a request reaches us the header is
/// trusted. A missing or malformed header is rejected as unauthenticated.
#[derive(Debug)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    if let Some(user_id_header) = req.headers().get("X-User-ID") {
      if let Ok(user_id_str) = user_id_header.to_str() {
        if let Ok(user_id) = Uuid::parse_str(user_id_str) {
          return futures_util::future::ready(Ok(AuthenticatedUser { user_id }));
        }
      }
    }
    warn!("AuthenticatedUser extractor: Missing or invalid X-User-ID header.");
    futures_util::future::ready(Err(AppError::Auth(
      "User authentication required. Missing or invalid X-User-ID header.".to_string(),
    )))
  }
}
