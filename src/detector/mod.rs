// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! PII detection.
//!
//! The [`Detector`] is a two-variant tagged union selected once at
//! construction: either a model-backed [`Recognizer`] (the consumed
//! entity-recognition capability, injected by the embedding application)
//! or the regex [`PatternRecognizers`] fallback. There is no module-level
//! singleton and no silent strategy swap at runtime - if model
//! initialization fails, the caller constructs a `PatternBased` detector
//! and that choice holds for the process lifetime.
//!
//! `detect` never surfaces an error: a per-call model failure degrades to
//! the pattern set for that call only.

pub mod patterns;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::entity::Span;
pub use patterns::{resolve_overlaps, PatternRecognizers, PATTERN_CONFIDENCE};

/// Per-call detection failure from a model-backed recognizer.
#[derive(Error, Debug)]
pub enum DetectError {
    #[error("model analysis failed: {0}")]
    Model(String),
}

/// The consumed entity-recognition capability: given text, return spans
/// with type, offsets and confidence.
///
/// Implementations wrap whatever NER engine the application runs (local
/// model, sidecar service). Offsets must be byte offsets into the exact
/// string passed in; spans that fall outside the string or split a UTF-8
/// character are discarded downstream.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Vec<Span>, DetectError>;
}

/// Detection strategy, fixed at construction.
pub enum Detector {
    /// Model-backed recognition with a per-call regex fallback.
    ModelBacked {
        model: Arc<dyn Recognizer>,
        fallback: PatternRecognizers,
    },
    /// Regex recognizers only.
    PatternBased(PatternRecognizers),
}

impl Detector {
    /// Select the detection strategy once. `Some(model)` yields a
    /// model-backed detector; `None` (model unavailable, failed to load)
    /// yields the pattern fallback for the remainder of process lifetime.
    #[must_use]
    pub fn new(recognizer: Option<Arc<dyn Recognizer>>) -> Self {
        match recognizer {
            Some(model) => {
                info!("detector: model-backed recognizer selected");
                Detector::ModelBacked { model, fallback: PatternRecognizers::new() }
            }
            None => {
                warn!("detector: no model available, using pattern fallback");
                Detector::PatternBased(PatternRecognizers::new())
            }
        }
    }

    /// Detect PII spans in `text`. Never fails; model errors degrade to
    /// the pattern set for this call.
    pub async fn detect(&self, text: &str) -> Vec<Span> {
        let spans = match self {
            Detector::PatternBased(patterns) => patterns.detect(text),
            Detector::ModelBacked { model, fallback } => match model.analyze(text).await {
                // Overlapping model spans would break the encoder's
                // offset-safe substitution, resolve them the same way
                // the pattern set does.
                Ok(spans) => patterns::resolve_overlaps(spans),
                Err(e) => {
                    warn!(error = %e, "model detection failed, falling back to patterns for this call");
                    crate::metrics::record_detect_fallback();
                    fallback.detect(text)
                }
            },
        };

        debug!(count = spans.len(), "detected PII spans");
        for span in &spans {
            crate::metrics::record_span_detected(self.engine_name(), span.entity_type.as_str());
        }
        spans
    }

    /// Which strategy is active ("model" or "pattern"), for logs/metrics.
    #[must_use]
    pub fn engine_name(&self) -> &'static str {
        match self {
            Detector::ModelBacked { .. } => "model",
            Detector::PatternBased(_) => "pattern",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;

    struct FixedRecognizer(Vec<Span>);

    #[async_trait]
    impl Recognizer for FixedRecognizer {
        async fn analyze(&self, _text: &str) -> Result<Vec<Span>, DetectError> {
            Ok(self.0.clone())
        }
    }

    struct FailingRecognizer;

    #[async_trait]
    impl Recognizer for FailingRecognizer {
        async fn analyze(&self, _text: &str) -> Result<Vec<Span>, DetectError> {
            Err(DetectError::Model("engine crashed".into()))
        }
    }

    #[tokio::test]
    async fn test_pattern_based_when_no_model() {
        let detector = Detector::new(None);
        assert_eq!(detector.engine_name(), "pattern");

        let spans = detector.detect("mail jane@x.com now").await;
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].entity_type, EntityType::EmailAddress);
    }

    #[tokio::test]
    async fn test_model_backed_uses_model_spans() {
        let fixed = vec![Span::new(EntityType::Person, 0, 4, 0.92)];
        let detector = Detector::new(Some(Arc::new(FixedRecognizer(fixed.clone()))));
        assert_eq!(detector.engine_name(), "model");

        let spans = detector.detect("John was here").await;
        assert_eq!(spans, fixed);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back_per_call() {
        let detector = Detector::new(Some(Arc::new(FailingRecognizer)));

        // The call still produces pattern-based spans instead of erroring
        let spans = detector.detect("mail jane@x.com now").await;
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].confidence, PATTERN_CONFIDENCE);

        // The strategy itself is unchanged
        assert_eq!(detector.engine_name(), "model");
    }
}
