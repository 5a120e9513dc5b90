// --- File: crates/consultify_gcal/src/token_store.rs ---
use crate::auth::TokenInfo;
use consultify_common::{internal_error, ConsultifyError};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the exchanged token payload to a local JSON file.
#[derive(Debug, Clone)]
pub struct TokenFileStore {
    path: PathBuf,
}

impl TokenFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file contents with `token` as pretty-printed JSON.
    pub async fn save(&self, token: &TokenInfo) -> Result<(), ConsultifyError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(token)?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            internal_error(format!(
                "Failed to write token file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        info!("Token saved to {}", self.path.display());
        Ok(())
    }
}
