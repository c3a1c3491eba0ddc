// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Engine facade wiring the pipeline together from configuration.
//!
//! [`PiiEngine`] owns the detector, vault and tiered store and exposes the
//! four pipeline operations. Construction is the one place strategy
//! selection happens: the detection engine is fixed here for the process
//! lifetime, and the external tier is attached only if the configured
//! Redis is reachable at startup (it can recover later through the
//! connection manager; an engine built without a `redis_url` never gains
//! one).

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::decoder::Decoder;
use crate::detector::{Detector, Recognizer};
use crate::encoder::{Encoder, TokenMapping};
use crate::results::QueryResult;
use crate::store::{FileTier, RedisTier, TieredStore};
use crate::vault::{CipherVault, VaultError};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Vault(#[from] VaultError),
}

pub struct PiiEngine {
    encoder: Encoder,
    decoder: Decoder,
    store: Arc<TieredStore>,
}

impl PiiEngine {
    /// Build an engine from configuration.
    ///
    /// `recognizer` is the optional model-backed detection capability;
    /// pass `None` to run on the regex fallback. An unreachable Redis is
    /// downgraded to file fallback with a warning, not an error - the
    /// engine must come up even when the cache is down.
    pub async fn from_config(
        config: &EngineConfig,
        recognizer: Option<Arc<dyn Recognizer>>,
    ) -> Result<Self, EngineError> {
        let vault = match &config.encryption_key {
            Some(encoded) => Arc::new(CipherVault::from_base64(encoded)?),
            None => {
                warn!("no encryption key configured, using an ephemeral per-process key");
                Arc::new(CipherVault::new(CipherVault::generate_key()))
            }
        };

        let ttl = Duration::from_secs(config.mapping_ttl_secs);
        let mut store = TieredStore::new(FileTier::new(&config.fallback_path), ttl);

        if let Some(url) = &config.redis_url {
            match RedisTier::connect(url, &config.redis_prefix).await {
                Ok(tier) => {
                    store = store.with_external(Arc::new(tier));
                }
                Err(e) => {
                    warn!(error = %e, "Redis unavailable at startup, using file fallback tier");
                }
            }
        }
        let store = Arc::new(store);

        let detector = Arc::new(Detector::new(recognizer));
        info!(
            engine = detector.engine_name(),
            ttl_secs = config.mapping_ttl_secs,
            "PII engine ready"
        );

        Ok(Self {
            encoder: Encoder::new(
                detector,
                vault.clone(),
                store.clone(),
                ttl,
                config.confidence_threshold,
            ),
            decoder: Decoder::new(vault, store.clone()),
            store,
        })
    }

    /// Tokenize PII in free text. See [`Encoder::encode`].
    pub async fn encode(&self, text: &str) -> Result<(String, Vec<TokenMapping>), VaultError> {
        self.encoder.encode(text).await
    }

    /// Tokenize PII in a query result. See [`Encoder::encode_results`].
    pub async fn encode_results(&self, result: &QueryResult) -> Result<QueryResult, VaultError> {
        self.encoder.encode_results(result).await
    }

    /// Reverse tokens in free text. See [`Decoder::decode`].
    pub async fn decode(&self, text: &str) -> String {
        self.decoder.decode(text).await
    }

    /// Reverse tokens in a query result. See [`Decoder::decode_results`].
    pub async fn decode_results(&self, result: &QueryResult) -> QueryResult {
        self.decoder.decode_results(result).await
    }

    /// The shared store handle (diagnostics, snapshot).
    #[must_use]
    pub fn store(&self) -> &Arc<TieredStore> {
        &self.store
    }
}
