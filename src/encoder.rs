// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The encode pipeline: detect spans, substitute tokens, commit mappings.
//!
//! Substitution processes spans in **descending** start order. Replacing a
//! span changes the working string's length, so any not-yet-processed span
//! at a lower offset keeps valid coordinates only if all edits happen to
//! its right. Ascending order would corrupt every offset after the first
//! length-changing substitution.
//!
//! Each span's mapping (token → encrypted original) is committed to the
//! tiered store before `encode` returns. There is no atomicity across a
//! whole call - an interrupted encode leaves already-committed spans in
//! the store, which is harmless (mappings are idempotent).

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::detector::Detector;
use crate::entity::EntityType;
use crate::metrics::LatencyTimer;
use crate::results::QueryResult;
use crate::store::TieredStore;
use crate::token::make_token;
use crate::vault::{CipherVault, VaultError};

/// One committed substitution, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMapping {
    pub token: String,
    pub entity_type: EntityType,
    /// Byte length of the replaced substring.
    pub original_len: usize,
}

pub struct Encoder {
    detector: Arc<Detector>,
    vault: Arc<CipherVault>,
    store: Arc<TieredStore>,
    ttl: Duration,
    confidence_threshold: f32,
}

impl Encoder {
    #[must_use]
    pub fn new(
        detector: Arc<Detector>,
        vault: Arc<CipherVault>,
        store: Arc<TieredStore>,
        ttl: Duration,
        confidence_threshold: f32,
    ) -> Self {
        Self { detector, vault, store, ttl, confidence_threshold }
    }

    /// Replace every detected PII span in `text` with its token and commit
    /// each mapping to the store.
    ///
    /// Returns the tokenized text and the list of substitutions made.
    /// Errors only on encryption failure; detection and storage problems
    /// degrade internally.
    pub async fn encode(&self, text: &str) -> Result<(String, Vec<TokenMapping>), VaultError> {
        let _timer = LatencyTimer::new("encode");

        let mut spans = self.detector.detect(text).await;
        spans.retain(|s| s.confidence >= self.confidence_threshold);

        // Descending start order keeps unprocessed offsets valid
        spans.sort_by(|a, b| b.start.cmp(&a.start));

        let mut encoded = text.to_string();
        let mut mappings = Vec::with_capacity(spans.len());

        for span in spans {
            // Model-backed recognizers are untrusted input: skip spans
            // that fall outside the string or split a UTF-8 character.
            let Some(original) = text.get(span.start..span.end) else {
                debug!(?span, "dropping span with invalid offsets");
                continue;
            };
            if original.is_empty() {
                continue;
            }

            let token = make_token(original, span.entity_type);
            let ciphertext = self.vault.encrypt(original)?;
            self.store.put(&token, &ciphertext, self.ttl).await;

            encoded.replace_range(span.start..span.end, &token);

            mappings.push(TokenMapping {
                token,
                entity_type: span.entity_type,
                original_len: span.end - span.start,
            });
        }

        // Report in ascending text order
        mappings.reverse();
        debug!(count = mappings.len(), "encoded PII spans");
        Ok((encoded, mappings))
    }

    /// Tokenize every string cell of a query result.
    ///
    /// Cells are encoded independently - each is its own coordinate space,
    /// so no cross-cell offset coordination is needed. Non-string values
    /// pass through untouched.
    pub async fn encode_results(&self, result: &QueryResult) -> Result<QueryResult, VaultError> {
        match result {
            QueryResult::Tabular { columns, rows, row_count } => Ok(QueryResult::Tabular {
                columns: columns.clone(),
                rows: self.encode_rows(rows).await?,
                row_count: *row_count,
            }),
            QueryResult::Records(records) => {
                let mut encoded = Vec::with_capacity(records.len());
                for record in records {
                    let mut out = serde_json::Map::with_capacity(record.len());
                    for (key, value) in record {
                        out.insert(key.clone(), self.encode_value(value).await?);
                    }
                    encoded.push(out);
                }
                Ok(QueryResult::Records(encoded))
            }
            QueryResult::Rows(rows) => Ok(QueryResult::Rows(self.encode_rows(rows).await?)),
        }
    }

    async fn encode_rows(&self, rows: &[Vec<Value>]) -> Result<Vec<Vec<Value>>, VaultError> {
        let mut encoded_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let mut encoded_row = Vec::with_capacity(row.len());
            for value in row {
                encoded_row.push(self.encode_value(value).await?);
            }
            encoded_rows.push(encoded_row);
        }
        Ok(encoded_rows)
    }

    async fn encode_value(&self, value: &Value) -> Result<Value, VaultError> {
        match value {
            Value::String(cell) => {
                let (encoded, _) = self.encode(cell).await?;
                Ok(Value::String(encoded))
            }
            other => Ok(other.clone()),
        }
    }
}
