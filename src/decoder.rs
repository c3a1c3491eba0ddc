// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! The decode pipeline: resolve tokens and substitute originals back.
//!
//! Decoding is fail-open on reversibility and fail-safe on
//! confidentiality: a token that cannot be resolved (store miss, expired
//! TTL, decryption failure after a key rotation) stays in the output
//! verbatim. Readability degrades; the original value never leaks.
//!
//! Textual replacement of whole tokens is safe because the grammar
//! (bracketed uppercase + 8 hex chars) does not occur in decrypted
//! plaintext by construction - a decrypted value containing a token shape
//! would itself have been tokenized on the way in.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::metrics::{self, LatencyTimer};
use crate::results::QueryResult;
use crate::store::TieredStore;
use crate::token::token_pattern;
use crate::vault::CipherVault;

pub struct Decoder {
    vault: Arc<CipherVault>,
    store: Arc<TieredStore>,
}

impl Decoder {
    #[must_use]
    pub fn new(vault: Arc<CipherVault>, store: Arc<TieredStore>) -> Self {
        Self { vault, store }
    }

    /// Replace every resolvable token in `text` with its original value.
    ///
    /// Never fails: unresolvable tokens are left in place.
    pub async fn decode(&self, text: &str) -> String {
        let _timer = LatencyTimer::new("decode");

        // De-duplicate: a token may repeat, resolve each once
        let tokens: BTreeSet<&str> = token_pattern()
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();

        if tokens.is_empty() {
            return text.to_string();
        }

        let mut decoded = text.to_string();
        for token in tokens {
            let Some(ciphertext) = self.store.get(token).await else {
                metrics::record_decode_failure("store_miss");
                warn!(token, "no stored mapping for token, leaving it in place");
                continue;
            };

            match self.vault.decrypt(&ciphertext) {
                Ok(original) => {
                    // Replace all occurrences of this exact token
                    decoded = decoded.replace(token, &original);
                }
                Err(e) => {
                    metrics::record_decode_failure("decrypt");
                    warn!(token, error = %e, "mapping undecryptable, leaving token in place");
                }
            }
        }

        debug!("decoded token substitutions applied");
        decoded
    }

    /// Decode every string leaf of a query result; other values pass
    /// through untouched.
    pub async fn decode_results(&self, result: &QueryResult) -> QueryResult {
        match result {
            QueryResult::Tabular { columns, rows, row_count } => QueryResult::Tabular {
                columns: columns.clone(),
                rows: self.decode_rows(rows).await,
                row_count: *row_count,
            },
            QueryResult::Records(records) => {
                let mut decoded = Vec::with_capacity(records.len());
                for record in records {
                    let mut out = serde_json::Map::with_capacity(record.len());
                    for (key, value) in record {
                        out.insert(key.clone(), self.decode_value(value).await);
                    }
                    decoded.push(out);
                }
                QueryResult::Records(decoded)
            }
            QueryResult::Rows(rows) => QueryResult::Rows(self.decode_rows(rows).await),
        }
    }

    async fn decode_rows(&self, rows: &[Vec<Value>]) -> Vec<Vec<Value>> {
        let mut decoded_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let mut decoded_row = Vec::with_capacity(row.len());
            for value in row {
                decoded_row.push(self.decode_value(value).await);
            }
            decoded_rows.push(decoded_row);
        }
        decoded_rows
    }

    async fn decode_value(&self, value: &Value) -> Value {
        match value {
            Value::String(cell) => Value::String(self.decode(cell).await),
            other => other.clone(),
        }
    }
}
