use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("external cache error: {0}")]
    Backend(String),
    #[error("file tier I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("file tier contents are not a valid mapping: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Which tier holds the durable copy of a mapping after `put`.
///
/// The in-process tier is always written; this reports where the write
/// landed beyond it. `Memory` means both the external and file tiers
/// failed - the mapping survives only until process restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTier {
    Memory,
    External,
    File,
}

impl WriteTier {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteTier::Memory => "memory",
            WriteTier::External => "external",
            WriteTier::File => "file",
        }
    }
}

/// The consumed external cache service: a key-value store with per-key
/// expiry and introspectable connectivity.
///
/// `is_connected` lets the tiered store choose the file fallback without
/// paying for a failed round trip on every operation.
#[async_trait]
pub trait ExternalTier: Send + Sync {
    fn is_connected(&self) -> bool;
    async fn set_with_ttl(&self, token: &str, ciphertext: &str, ttl: Duration)
        -> Result<(), StoreError>;
    async fn get(&self, token: &str) -> Result<Option<String>, StoreError>;
}
