//! Configuration for the tokenization engine.
//!
//! # Example
//!
//! ```
//! use pii_vault::EngineConfig;
//!
//! // Minimal config (uses defaults)
//! let config = EngineConfig::default();
//! assert_eq!(config.mapping_ttl_secs, 86_400);
//!
//! // Full config
//! let config = EngineConfig {
//!     redis_url: Some("redis://localhost:6379".into()),
//!     confidence_threshold: 0.35,
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;

/// Configuration for the tokenization engine.
///
/// All fields have sensible defaults. For production use you should set
/// `redis_url` (shared token mappings across processes) and
/// `encryption_key` (a base64-encoded 32-byte key; without one the engine
/// generates an ephemeral key and stored mappings do not survive restart).
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Redis connection string (e.g., "redis://localhost:6379").
    /// `None` disables the external tier; mappings go to the file fallback.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Key prefix for the external tier, namespacing mappings when the
    /// Redis instance is shared with other applications.
    #[serde(default = "default_redis_prefix")]
    pub redis_prefix: String,

    /// Path of the JSON file fallback used when Redis is unreachable.
    /// Single-process constraint: the file tier is not safe for concurrent
    /// writers from separate processes.
    #[serde(default = "default_fallback_path")]
    pub fallback_path: String,

    /// TTL in seconds for mappings in the external tier (default: 1 day).
    /// The file tier keeps mappings indefinitely; the in-process tier
    /// lives until process restart.
    #[serde(default = "default_mapping_ttl_secs")]
    pub mapping_ttl_secs: u64,

    /// Minimum detector confidence for a span to be acted on.
    /// Default 0.0: every returned span is tokenized regardless of score.
    #[serde(default)]
    pub confidence_threshold: f32,

    /// Base64-encoded 32-byte encryption key. `None` means an ephemeral
    /// per-process key.
    #[serde(default)]
    pub encryption_key: Option<String>,
}

fn default_redis_prefix() -> String { "pii:".to_string() }
fn default_fallback_path() -> String { "./.token_store.json".to_string() }
fn default_mapping_ttl_secs() -> u64 { 86_400 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            redis_prefix: default_redis_prefix(),
            fallback_path: default_fallback_path(),
            mapping_ttl_secs: default_mapping_ttl_secs(),
            confidence_threshold: 0.0,
            encryption_key: None,
        }
    }
}
