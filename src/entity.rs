// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Entity types and detected spans.
//!
//! A [`Span`] is a single detected PII occurrence: what kind of entity it is,
//! where it sits in the scanned string, and how confident the detector was.
//! Spans are transient - they are never persisted and their offsets are only
//! meaningful relative to the exact string that was scanned.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// The closed set of entity types the engine recognizes.
///
/// The uppercase form of each variant is the wire-level token prefix, so it
/// feeds directly into the token grammar (`[PERSON_A1B2C3D4]` etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "PERSON")]
    Person,
    #[serde(rename = "ORGANIZATION")]
    Organization,
    #[serde(rename = "LOCATION")]
    Location,
    #[serde(rename = "EMAIL_ADDRESS")]
    EmailAddress,
    #[serde(rename = "PHONE_NUMBER")]
    PhoneNumber,
    #[serde(rename = "NATIONAL_ID")]
    NationalId,
}

impl EntityType {
    /// All entity types, in detection order.
    pub const ALL: [EntityType; 6] = [
        EntityType::Person,
        EntityType::Organization,
        EntityType::Location,
        EntityType::EmailAddress,
        EntityType::PhoneNumber,
        EntityType::NationalId,
    ];

    /// Uppercase identifier used as the token prefix.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Organization => "ORGANIZATION",
            EntityType::Location => "LOCATION",
            EntityType::EmailAddress => "EMAIL_ADDRESS",
            EntityType::PhoneNumber => "PHONE_NUMBER",
            EntityType::NationalId => "NATIONAL_ID",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERSON" => Ok(EntityType::Person),
            "ORGANIZATION" => Ok(EntityType::Organization),
            "LOCATION" => Ok(EntityType::Location),
            "EMAIL_ADDRESS" => Ok(EntityType::EmailAddress),
            "PHONE_NUMBER" => Ok(EntityType::PhoneNumber),
            "NATIONAL_ID" => Ok(EntityType::NationalId),
            other => Err(UnknownEntityType(other.to_string())),
        }
    }
}

/// Error for entity type strings outside the recognized set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown entity type: {0}")]
pub struct UnknownEntityType(pub String);

/// A detected PII occurrence in a specific source string.
///
/// Offsets are 0-based **byte** offsets, end-exclusive, relative to the exact
/// string that was scanned. Spans are produced by the detector and consumed
/// by the encoder; they are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub entity_type: EntityType,
    pub start: usize,
    pub end: usize,
    /// Advisory score in `[0, 1]`. The encoder only thresholds this when
    /// configured to; by default every span is actionable.
    pub confidence: f32,
}

impl Span {
    #[must_use]
    pub fn new(entity_type: EntityType, start: usize, end: usize, confidence: f32) -> Self {
        Self { entity_type, start, end, confidence }
    }

    /// Whether this span overlaps another (half-open interval intersection).
    #[must_use]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Length of the covered text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_round_trips_through_str() {
        for et in EntityType::ALL {
            assert_eq!(et.as_str().parse::<EntityType>().unwrap(), et);
        }
    }

    #[test]
    fn test_unknown_entity_type_is_rejected() {
        let err = "CREDIT_CARD".parse::<EntityType>().unwrap_err();
        assert!(err.to_string().contains("CREDIT_CARD"));
    }

    #[test]
    fn test_serde_uses_uppercase_form() {
        let json = serde_json::to_string(&EntityType::EmailAddress).unwrap();
        assert_eq!(json, "\"EMAIL_ADDRESS\"");

        let et: EntityType = serde_json::from_str("\"NATIONAL_ID\"").unwrap();
        assert_eq!(et, EntityType::NationalId);
    }

    #[test]
    fn test_span_overlap() {
        let a = Span::new(EntityType::Person, 0, 10, 0.9);
        let b = Span::new(EntityType::Location, 5, 15, 0.9);
        let c = Span::new(EntityType::Location, 10, 15, 0.9);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // End-exclusive: touching spans do not overlap
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_span_len() {
        let s = Span::new(EntityType::Person, 8, 18, 1.0);
        assert_eq!(s.len(), 10);
        assert!(!s.is_empty());
    }
}
