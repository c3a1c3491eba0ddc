//! Query result shapes.
//!
//! Tabular results arrive from the SQL layer in one of three shapes. The
//! shape is decided here, at the boundary where results enter the engine,
//! as a closed tagged union - the encode/decode cores walk the variants
//! instead of re-sniffing structure cell by cell.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A query result entering or leaving the tokenization pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResult {
    /// `{"columns": [...], "rows": [[...], ...], "row_count": N}`
    Tabular {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
        #[serde(default)]
        row_count: usize,
    },
    /// A list of column→value records.
    Records(Vec<Map<String, Value>>),
    /// A list of positional rows.
    Rows(Vec<Vec<Value>>),
}

impl QueryResult {
    /// Number of rows in the result, regardless of shape.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Tabular { rows, .. } => rows.len(),
            QueryResult::Records(records) => records.len(),
            QueryResult::Rows(rows) => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
