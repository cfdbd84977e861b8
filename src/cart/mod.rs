// src/cart/mod.rs

//! Cart persistence.
//!
//! The cart is a per-user named slot holding a JSON-encoded array of
//! [`CartLine`]s: read whole on load, rewritten whole on save, removed on
//! clear. The store is injected behind the [`CartStore`] trait so the order
//! placement flow and its tests can run against an in-memory fake.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::CartLine;

pub mod file;
pub mod memory;

pub use file::JsonFileCartStore;
pub use memory::MemoryCartStore;

#[async_trait]
pub trait CartStore: Send + Sync {
  /// Current cart contents for the user; an absent slot reads as empty.
  async fn load(&self, user_id: Uuid) -> Result<Vec<CartLine>>;

  /// Replace the user's cart wholesale.
  async fn save(&self, user_id: Uuid, lines: &[CartLine]) -> Result<()>;

  /// Drop the user's cart slot entirely.
  async fn clear(&self, user_id: Uuid) -> Result<()>;

  /// Append one line, enforcing product-id uniqueness within the cart.
  async fn add(&self, user_id: Uuid, line: CartLine) -> Result<Vec<CartLine>> {
    let mut lines = self.load(user_id).await?;
    if lines.iter().any(|existing| existing.product_id == line.product_id) {
      return Err(AppError::Validation(format!(
        "Product {} is already in the cart.",
        line.product_id
      )));
    }
    lines.push(line);
    self.save(user_id, &lines).await?;
    Ok(lines)
  }
}
