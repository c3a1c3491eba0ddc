use std::collections::HashMap;

use dashmap::DashMap;

/// In-process token→ciphertext tier.
///
/// Authoritative and fastest; lost on process restart. No TTL. Shared by
/// all concurrent encoder/decoder invocations - `DashMap` keeps locking
/// scoped to the map mutation, never around encryption or network calls.
pub struct MemoryTier {
    data: DashMap<String, String>,
}

impl MemoryTier {
    #[must_use]
    pub fn new() -> Self {
        Self { data: DashMap::new() }
    }

    #[must_use]
    pub fn get(&self, token: &str) -> Option<String> {
        self.data.get(token).map(|r| r.value().clone())
    }

    pub fn insert(&self, token: &str, ciphertext: &str) {
        self.data.insert(token.to_string(), ciphertext.to_string());
    }

    /// Get current mapping count
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear all mappings (models a process restart in tests)
    pub fn clear(&self) {
        self.data.clear();
    }

    /// Copy of the current mapping, for diagnostics or external persistence.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.data
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl Default for MemoryTier {
    fn default() -> Self {
        Self::new()
    }
}
