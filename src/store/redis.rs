// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Redis external cache tier.
//!
//! Token mappings are stored as plain strings under a configurable key
//! prefix with a per-key TTL (`SET ... EX`). Connectivity is tracked in an
//! atomic flag maintained from operation outcomes, so the tiered store can
//! route to the file fallback without paying for a failed round trip each
//! time. `ConnectionManager` reconnects in the background; the first
//! successful operation after an outage flips the flag back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{info, warn};

use crate::resilience::retry::{retry, RetryConfig};
use super::traits::{ExternalTier, StoreError};

pub struct RedisTier {
    connection: ConnectionManager,
    /// Key prefix for namespacing (e.g., "pii:" → "pii:[PERSON_AB12CD34]")
    prefix: String,
    connected: AtomicBool,
}

impl RedisTier {
    /// Connect to Redis and verify the connection with a PING.
    ///
    /// Uses the startup retry preset: fail within seconds on bad config
    /// rather than hanging engine construction.
    pub async fn connect(connection_string: &str, prefix: &str) -> Result<Self, StoreError> {
        let client = Client::open(connection_string)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut connection = retry("redis_connect", &RetryConfig::startup(), || async {
            ConnectionManager::new(client.clone()).await
        })
        .await
        .map_err(|e: redis::RedisError| StoreError::Backend(e.to_string()))?;

        let _: String = redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        info!(url = connection_string, "connected to Redis external tier");
        Ok(Self {
            connection,
            prefix: prefix.to_string(),
            connected: AtomicBool::new(true),
        })
    }

    #[inline]
    fn prefixed_key(&self, token: &str) -> String {
        format!("{}{}", self.prefix, token)
    }

    fn record_outcome<T>(&self, result: Result<T, redis::RedisError>) -> Result<T, StoreError> {
        match result {
            Ok(val) => {
                if !self.connected.swap(true, Ordering::Release) {
                    info!("Redis external tier reachable again");
                }
                Ok(val)
            }
            Err(e) => {
                if self.connected.swap(false, Ordering::Release) {
                    warn!(error = %e, "Redis external tier unreachable, marking disconnected");
                }
                Err(StoreError::Backend(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl ExternalTier for RedisTier {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn set_with_ttl(
        &self,
        token: &str,
        ciphertext: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let conn = self.connection.clone();
        let key = self.prefixed_key(token);
        let ttl_secs = ttl.as_secs().max(1);

        let result = retry("redis_set_mapping", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            let key = key.clone();
            let value = ciphertext.to_string();
            async move {
                let _: () = conn.set_ex(&key, &value, ttl_secs).await?;
                Ok(())
            }
        })
        .await;

        self.record_outcome(result)
    }

    async fn get(&self, token: &str) -> Result<Option<String>, StoreError> {
        let conn = self.connection.clone();
        let key = self.prefixed_key(token);

        let result = retry("redis_get_mapping", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            let key = key.clone();
            async move {
                let value: Option<String> = conn.get(&key).await?;
                Ok(value)
            }
        })
        .await;

        self.record_outcome(result)
    }
}
