//! # pii-vault
//!
//! Reversible PII tokenization for text and tabular query results.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Encoder                             │
//! │  • Detects PII spans (model-backed or regex fallback)      │
//! │  • Substitutes tokens right-to-left (offset safe)          │
//! │  • Encrypts originals, commits mappings to the store       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 In-Process Tier (DashMap)                   │
//! │  • Authoritative, O(1), no TTL, lost on restart            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                External Tier (Redis, TTL)                   │
//! │  • Shared across processes, 86400s default expiry          │
//! │  • Connectivity tracked so misses don't pay round trips    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                    (only when Redis is unreachable)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                File Tier (JSON fallback)                    │
//! │  • Whole-file read-modify-write under a process lock       │
//! │  • Single-instance fallback, never a shared store          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Decoder                             │
//! │  • Scans for the token grammar, resolves through tiers     │
//! │  • Decrypts and substitutes originals back                 │
//! │  • Fail-open: unresolved tokens stay in the output         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pii_vault::{EngineConfig, PiiEngine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = EngineConfig {
//!         redis_url: Some("redis://localhost:6379".into()),
//!         ..Default::default()
//!     };
//!
//!     // No model-backed recognizer: regex fallback detection
//!     let engine = PiiEngine::from_config(&config, None).await.expect("engine init");
//!
//!     let (tokenized, mappings) = engine
//!         .encode("Contact John Smith at john.smith@example.com")
//!         .await
//!         .expect("encode");
//!     println!("outbound: {} ({} spans)", tokenized, mappings.len());
//!
//!     let restored = engine.decode(&tokenized).await;
//!     println!("inbound:  {}", restored);
//! }
//! ```
//!
//! ## Guarantees and limits
//!
//! - **Deterministic tokens**: same `(value, entity type)` always yields
//!   the same token; re-encoding is idempotent. The 8-hex-char hash space
//!   admits collisions at the 2^32 birthday bound - accepted, documented.
//! - **Fail-open decode**: a token that cannot be resolved or decrypted
//!   stays opaque in the output; originals never leak on failure.
//! - **Key rotation invalidates history**: ciphertexts are AES-256-GCM
//!   under a process-wide key; after a key change, stored mappings are
//!   permanently unrecoverable and decode leaves their tokens in place.
//! - **File tier is single-instance**: the JSON fallback is guarded by a
//!   process-local lock only. Running multiple processes against one
//!   fallback file is not supported.
//!
//! ## Modules
//!
//! - [`engine`]: the [`PiiEngine`] facade wiring everything together
//! - [`detector`]: span detection (model-backed or pattern fallback)
//! - [`token`]: token derivation and the grammar contract
//! - [`vault`]: authenticated encryption of original values
//! - [`store`]: the tiered memory → Redis → file mapping store
//! - [`encoder`] / [`decoder`]: the two pipeline directions
//! - [`results`]: tagged query-result shapes
//! - [`resilience`]: retry with backoff for external-cache operations

pub mod config;
pub mod entity;
pub mod token;
pub mod vault;
pub mod detector;
pub mod store;
pub mod results;
pub mod encoder;
pub mod decoder;
pub mod engine;
pub mod resilience;
pub mod metrics;

pub use config::EngineConfig;
pub use entity::{EntityType, Span, UnknownEntityType};
pub use token::{make_token, token_pattern, TOKEN_GRAMMAR};
pub use vault::{CipherVault, VaultError};
pub use detector::{DetectError, Detector, PatternRecognizers, Recognizer};
pub use store::{ExternalTier, FileTier, MemoryTier, RedisTier, StoreError, TieredStore, WriteTier};
pub use results::QueryResult;
pub use encoder::{Encoder, TokenMapping};
pub use decoder::Decoder;
pub use engine::{EngineError, PiiEngine};
pub use metrics::LatencyTimer;
