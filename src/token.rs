//! Token derivation and the token text grammar.
//!
//! A token is the opaque placeholder substituted for a PII span:
//! `[ENTITY_TYPE_XXXXXXXX]` where the suffix is the first 4 bytes of
//! SHA-256 over the original value, uppercase hex. Derivation is pure and
//! deterministic, so the decoder can work from token text alone - no
//! auxiliary index is needed to map a token back to its store key.
//!
//! The grammar is a wire-level contract shared with every downstream
//! consumer of tokenized text. Both sides live in this module so the
//! encode-side format and the decode-side regex cannot drift apart.
//! Changing either is a breaking change.
//!
//! Two distinct values of the same type can collide on the 8-character
//! prefix (birthday bound at 2^32). This is accepted and documented: the
//! later mapping overwrites the earlier one.

use std::sync::OnceLock;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::entity::EntityType;

/// Decode-side grammar: any substring of this shape is treated as a token.
///
/// Legitimate text that happens to match (uppercase word, underscore, 8 hex
/// chars, all bracketed) will be misinterpreted by the decoder; such tokens
/// simply fail the store lookup and are left in place.
pub const TOKEN_GRAMMAR: &str = r"\[[A-Z_]+_[0-9A-F]{8}\]";

/// Compiled grammar regex, built once per process.
pub fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(TOKEN_GRAMMAR).expect("token grammar must compile"))
}

/// Derive the token for an original value and its entity type.
///
/// Same `(value, entity_type)` always yields the same token. The hash
/// covers the value only; the type is carried in the prefix.
///
/// # Example
///
/// ```
/// use pii_vault::{make_token, EntityType};
///
/// let a = make_token("John Smith", EntityType::Person);
/// let b = make_token("John Smith", EntityType::Person);
/// assert_eq!(a, b);
/// assert!(a.starts_with("[PERSON_"));
/// assert!(a.ends_with(']'));
/// ```
#[must_use]
pub fn make_token(value: &str, entity_type: EntityType) -> String {
    let digest = Sha256::digest(value.as_bytes());
    let short = hex::encode_upper(&digest[..4]);
    format!("[{}_{}]", entity_type.as_str(), short)
}
