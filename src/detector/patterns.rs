//! Regex fallback recognizers.
//!
//! Independent re-implementations of the six entity recognizers using
//! regular expressions, used when no model-backed recognizer is available
//! (or when one fails mid-call). Every span gets a fixed low confidence of
//! 0.5 - these patterns are deliberately loose, graceful degradation over
//! failing closed.

use regex::Regex;

use crate::entity::{EntityType, Span};

/// Fixed confidence for all pattern-based spans.
pub const PATTERN_CONFIDENCE: f32 = 0.5;

/// The regex recognizer set.
pub struct PatternRecognizers {
    person: Regex,
    organization: Regex,
    location: Regex,
    email: Regex,
    phone: Regex,
    national_id: Regex,
}

impl Default for PatternRecognizers {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternRecognizers {
    pub fn new() -> Self {
        Self {
            // Very basic name-like pattern: two capitalized words
            person: Regex::new(r"\b[A-Z][a-z]+ [A-Z][a-z]+\b")
                .expect("person pattern must compile"),

            // Capitalized words ending in a legal/organizational suffix
            organization: Regex::new(
                r"\b[A-Z][A-Za-z&.'-]+(?:\s+[A-Z][A-Za-z&.'-]+)*\s+(?:Group|Ltd|Limited|LLC|Inc|Corp|Corporation|Company|Co\.|Technologies|Solutions|Systems|Enterprises)\b",
            )
            .expect("organization pattern must compile"),

            // Capitalized word(s) after a locating preposition; heuristic
            location: Regex::new(
                r"\b(?:in|at|from|near)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)\b",
            )
            .expect("location pattern must compile"),

            email: Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
                .expect("email pattern must compile"),

            // International formats, 10+ digits with separators
            phone: Regex::new(r"\+?[\d\s-]{10,}").expect("phone pattern must compile"),

            // Aadhaar-style 12-digit national ID, optionally space-grouped
            national_id: Regex::new(r"\b\d{4}\s?\d{4}\s?\d{4}\b")
                .expect("national id pattern must compile"),
        }
    }

    /// Scan `text` with every recognizer and return non-overlapping spans
    /// ordered by start offset.
    ///
    /// When two recognizers claim overlapping ranges the span collected
    /// first (longer first on equal start) wins; the encoder relies on the
    /// returned set being non-overlapping.
    pub fn detect(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();

        for (entity_type, regex) in [
            (EntityType::EmailAddress, &self.email),
            (EntityType::NationalId, &self.national_id),
            (EntityType::PhoneNumber, &self.phone),
            (EntityType::Organization, &self.organization),
            (EntityType::Person, &self.person),
        ] {
            for found in regex.find_iter(text) {
                spans.push(Span::new(entity_type, found.start(), found.end(), PATTERN_CONFIDENCE));
            }
        }

        // Location captures the place name, not the preposition
        for caps in self.location.captures_iter(text) {
            if let Some(place) = caps.get(1) {
                spans.push(Span::new(
                    EntityType::Location,
                    place.start(),
                    place.end(),
                    PATTERN_CONFIDENCE,
                ));
            }
        }

        resolve_overlaps(spans)
    }
}

/// Drop spans overlapping an already-kept span. Sort order (start asc,
/// longer first) means the earliest, longest claim on a range wins.
pub fn resolve_overlaps(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut kept: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        if span.is_empty() {
            continue;
        }
        if !kept.iter().any(|k| k.overlaps(&span)) {
            kept.push(span);
        }
    }
    kept
}
