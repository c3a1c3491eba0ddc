// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The tiered token→ciphertext store.
//!
//! Logically a single mapping realized across three tiers with strict
//! precedence: in-process memory → external cache (TTL-bound, shared
//! across processes) → local JSON file (single-writer fallback).
//!
//! Lookup invariant: a hit in any slower tier is back-filled into the
//! in-process tier, so repeated lookups are O(1) after first resolution.
//! A file hit is additionally pushed back to the external tier when it is
//! reachable again, re-converging the tiers after an outage.
//!
//! Writes prefer the external tier; only when it is unreachable does the
//! mapping go to the file instead (never both, so a TTL-less file copy
//! cannot mask expiry semantics). Absence of a token is a normal outcome
//! at every tier, not an error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::metrics;
use super::file::FileTier;
use super::memory::MemoryTier;
use super::traits::{ExternalTier, WriteTier};

pub struct TieredStore {
    memory: MemoryTier,
    external: Option<Arc<dyn ExternalTier>>,
    file: FileTier,
    /// TTL applied when back-filling the external tier from a file hit.
    backfill_ttl: Duration,
}

impl TieredStore {
    #[must_use]
    pub fn new(file: FileTier, backfill_ttl: Duration) -> Self {
        Self {
            memory: MemoryTier::new(),
            external: None,
            file,
            backfill_ttl,
        }
    }

    /// Attach an external cache tier.
    #[must_use]
    pub fn with_external(mut self, external: Arc<dyn ExternalTier>) -> Self {
        self.external = Some(external);
        self
    }

    /// Store a mapping.
    ///
    /// The in-process tier is always written synchronously. The durable
    /// copy then goes to the external tier with the given TTL, or to the
    /// file when the external tier is unreachable. A file write failure is
    /// logged and swallowed: the mapping stays resolvable in-process and a
    /// later decode of that token in another process fails open.
    pub async fn put(&self, token: &str, ciphertext: &str, ttl: Duration) -> WriteTier {
        self.memory.insert(token, ciphertext);
        metrics::record_store_operation("memory", "put", "success");

        if let Some(external) = self.external_if_connected() {
            match external.set_with_ttl(token, ciphertext, ttl).await {
                Ok(()) => {
                    metrics::record_store_operation("external", "put", "success");
                    return WriteTier::External;
                }
                Err(e) => {
                    metrics::record_store_operation("external", "put", "error");
                    warn!(token, error = %e, "external tier write failed, falling back to file");
                }
            }
        }

        match self.file.put(token, ciphertext).await {
            Ok(()) => {
                metrics::record_store_operation("file", "put", "success");
                WriteTier::File
            }
            Err(e) => {
                metrics::record_store_operation("file", "put", "error");
                warn!(token, error = %e, "file tier write failed, mapping is memory-only");
                WriteTier::Memory
            }
        }
    }

    /// Resolve a token to its ciphertext, or `None` if no tier has it.
    pub async fn get(&self, token: &str) -> Option<String> {
        if let Some(ciphertext) = self.memory.get(token) {
            metrics::record_store_operation("memory", "get", "hit");
            return Some(ciphertext);
        }
        metrics::record_store_operation("memory", "get", "miss");

        if let Some(external) = self.external_if_connected() {
            match external.get(token).await {
                Ok(Some(ciphertext)) => {
                    metrics::record_store_operation("external", "get", "hit");
                    self.memory.insert(token, &ciphertext);
                    return Some(ciphertext);
                }
                Ok(None) => {
                    metrics::record_store_operation("external", "get", "miss");
                }
                Err(e) => {
                    metrics::record_store_operation("external", "get", "error");
                    warn!(token, error = %e, "external tier lookup failed, trying file");
                }
            }
        }

        match self.file.get(token).await {
            Ok(Some(ciphertext)) => {
                metrics::record_store_operation("file", "get", "hit");
                self.memory.insert(token, &ciphertext);
                self.backfill_external(token, &ciphertext).await;
                Some(ciphertext)
            }
            Ok(None) => {
                metrics::record_store_operation("file", "get", "miss");
                debug!(token, "token absent from all tiers");
                None
            }
            Err(e) => {
                metrics::record_store_operation("file", "get", "error");
                warn!(token, error = %e, "file tier lookup failed");
                None
            }
        }
    }

    /// Copy of the current in-process mapping (diagnostics, external
    /// persistence by the embedding app).
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.memory.snapshot()
    }

    /// In-process tier handle for maintenance and tests.
    #[must_use]
    pub fn memory(&self) -> &MemoryTier {
        &self.memory
    }

    fn external_if_connected(&self) -> Option<&Arc<dyn ExternalTier>> {
        self.external.as_ref().filter(|e| e.is_connected())
    }

    /// Best-effort push of a file-tier hit back into the external tier.
    async fn backfill_external(&self, token: &str, ciphertext: &str) {
        if let Some(external) = self.external_if_connected() {
            if let Err(e) = external.set_with_ttl(token, ciphertext, self.backfill_ttl).await {
                debug!(token, error = %e, "external back-fill from file hit failed");
            }
        }
    }
}
