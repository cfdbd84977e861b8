// src/cart/file.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::cart::CartStore;
use crate::errors::{AppError, Result};
use crate::models::CartLine;

/// File-backed cart store: one JSON slot file per user under a base
/// directory, named `merchant_cart_<user_id>.json` after the single
/// local-storage slot this replaces.
#[derive(Debug, Clone)]
pub struct JsonFileCartStore {
  base_dir: PathBuf,
}

impl JsonFileCartStore {
  pub fn new(base_dir: impl Into<PathBuf>) -> Self {
    Self {
      base_dir: base_dir.into(),
    }
  }

  fn slot_path(&self, user_id: Uuid) -> PathBuf {
    self.base_dir.join(format!("merchant_cart_{}.json", user_id))
  }
}

fn storage_error(context: &str, path: &Path, err: impl Into<anyhow::Error>) -> AppError {
  AppError::CartStorage {
    source: err.into().context(format!("{} ({})", context, path.display())),
  }
}

#[async_trait]
impl CartStore for JsonFileCartStore {
  #[instrument(name = "cart_store::load", skip(self), fields(user_id = %user_id))]
  async fn load(&self, user_id: Uuid) -> Result<Vec<CartLine>> {
    let path = self.slot_path(user_id);
    let raw = match tokio::fs::read_to_string(&path).await {
      Ok(raw) => raw,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        debug!("No cart slot on disk; treating cart as empty.");
        return Ok(Vec::new());
      }
      Err(err) => return Err(storage_error("reading cart slot", &path, err)),
    };
    let lines: Vec<CartLine> =
      serde_json::from_str(&raw).map_err(|err| storage_error("decoding cart slot", &path, err))?;
    Ok(lines)
  }

  #[instrument(name = "cart_store::save", skip(self, lines), fields(user_id = %user_id, line_count = lines.len()))]
  async fn save(&self, user_id: Uuid, lines: &[CartLine]) -> Result<()> {
    let path = self.slot_path(user_id);
    tokio::fs::create_dir_all(&self.base_dir)
      .await
      .map_err(|err| storage_error("creating cart store directory", &self.base_dir, err))?;
    let encoded =
      serde_json::to_string(lines).map_err(|err| storage_error("encoding cart slot", &path, err))?;

    // Write to a sibling temp file and rename it over the slot. The rename
    // is atomic on the same filesystem, so a crash mid-save leaves either
    // the old slot or the new one, never a truncated JSON file.
    let tmp_path = self.base_dir.join(format!("merchant_cart_{}.json.tmp", user_id));
    tokio::fs::write(&tmp_path, encoded)
      .await
      .map_err(|err| storage_error("writing cart slot", &tmp_path, err))?;
    tokio::fs::rename(&tmp_path, &path)
      .await
      .map_err(|err| storage_error("committing cart slot", &path, err))?;
    Ok(())
  }

  #[instrument(name = "cart_store::clear", skip(self), fields(user_id = %user_id))]
  async fn clear(&self, user_id: Uuid) -> Result<()> {
    let path = self.slot_path(user_id);
    match tokio::fs::remove_file(&path).await {
      Ok(()) => Ok(()),
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(err) => Err(storage_error("removing cart slot", &path, err)),
    }
  }
}
