// src/cart/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::cart::CartStore;
use crate::errors::Result;
use crate::models::CartLine;

/// In-memory cart store. Used by tests as the substitutable fake the file
/// store is designed around, and usable for demos without a writable disk.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
  slots: Mutex<HashMap<Uuid, Vec<CartLine>>>,
}

impl MemoryCartStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl CartStore for MemoryCartStore {
  async fn load(&self, user_id: Uuid) -> Result<Vec<CartLine>> {
    Ok(self.slots.lock().get(&user_id).cloned().unwrap_or_default())
  }

  async fn save(&self, user_id: Uuid, lines: &[CartLine]) -> Result<()> {
    self.slots.lock().insert(user_id, lines.to_vec());
    Ok(())
  }

  async fn clear(&self, user_id: Uuid) -> Result<()> {
    self.slots.lock().remove(&user_id);
    Ok(())
  }
}
