//! Local persisted fallback tier.
//!
//! A single JSON object mapping token strings to ciphertext strings, used
//! when the external cache is unreachable. Reads and read-modify-write
//! cycles go through a process-local mutex, which makes concurrent writers
//! from the *same* process safe. It does not protect against writers from
//! separate processes - the file tier is a single-instance fallback, not a
//! multi-instance shared store.
//!
//! Mappings here are never proactively pruned; persistence is best-effort
//! and whole-file (token volume is expected to stay small relative to
//! session lifetimes).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use tracing::debug;

use super::traits::StoreError;

pub struct FileTier {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTier {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole mapping. A missing file is an empty mapping, not an
    /// error; a present-but-corrupt file is an error the caller decides
    /// how to degrade on.
    async fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist one mapping (whole-file read-modify-write under the lock).
    pub async fn put(&self, token: &str, ciphertext: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let mut data = self.load().await.unwrap_or_default();
        data.insert(token.to_string(), ciphertext.to_string());

        let bytes = serde_json::to_vec(&data)?;
        tokio::fs::write(&self.path, bytes).await?;

        debug!(token, path = %self.path.display(), "persisted mapping to file tier");
        Ok(())
    }

    /// Look up one token. Reads under the lock so a concurrent `put` never
    /// exposes a half-written file.
    pub async fn get(&self, token: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(token))
    }
}
