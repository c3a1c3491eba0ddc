//! Property-based fuzz tests.
//!
//! Feeds adversarial inputs through the token grammar, the overlap
//! resolver, and the full encode/decode pipeline looking for panics and
//! broken invariants. Runs against the in-process and file tiers only.

use proptest::prelude::*;
use tempfile::tempdir;
use tokio::runtime::Runtime;

use pii_vault::{
    make_token, token_pattern, EngineConfig, EntityType, PiiEngine, Span,
};

fn entity_type_strategy() -> impl Strategy<Value = EntityType> {
    prop::sample::select(EntityType::ALL.to_vec())
}

fn span_strategy() -> impl Strategy<Value = Span> {
    (entity_type_strategy(), 0usize..200, 0usize..40, 0.0f32..=1.0).prop_map(
        |(entity_type, start, len, confidence)| Span::new(entity_type, start, start + len, confidence),
    )
}

async fn engine_in(dir: &tempfile::TempDir) -> PiiEngine {
    let config = EngineConfig {
        fallback_path: dir.path().join("store.json").to_string_lossy().into_owned(),
        ..Default::default()
    };
    PiiEngine::from_config(&config, None).await.expect("engine init")
}

proptest! {
    /// Every token produced for any value/type pair matches the grammar.
    #[test]
    fn token_always_matches_grammar(value in ".*", entity_type in entity_type_strategy()) {
        let token = make_token(&value, entity_type);
        let found = token_pattern().find(&token).expect("token must match grammar");
        prop_assert_eq!(found.as_str(), token.as_str());
    }

    /// The same value always yields the same token; the token never
    /// contains the value it stands for (beyond trivially short inputs).
    #[test]
    fn token_is_deterministic(value in ".{4,64}", entity_type in entity_type_strategy()) {
        let a = make_token(&value, entity_type);
        let b = make_token(&value, entity_type);
        prop_assert_eq!(&a, &b);
        prop_assert!(!a.contains(&value));
    }

    /// Overlap resolution always yields spans that are sorted by start
    /// and pairwise disjoint, and never invents a span.
    #[test]
    fn resolved_spans_are_sorted_and_disjoint(spans in prop::collection::vec(span_strategy(), 0..32)) {
        let original_count = spans.len();
        let kept = pii_vault::detector::resolve_overlaps(spans);

        prop_assert!(kept.len() <= original_count);
        for pair in kept.windows(2) {
            prop_assert!(pair[0].start <= pair[1].start);
            prop_assert!(!pair[0].overlaps(&pair[1]));
        }
    }
}

proptest! {
    // Full-pipeline cases spin up an engine each; keep the case count low.
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Encoding never panics on arbitrary unicode, and decoding the
    /// result restores the input exactly.
    #[test]
    fn encode_decode_roundtrips(text in "\\PC{0,200}") {
        let rt = Runtime::new().expect("runtime");
        rt.block_on(async {
            let dir = tempdir().unwrap();
            let engine = engine_in(&dir).await;

            let (encoded, _) = engine.encode(&text).await.expect("encode");
            let decoded = engine.decode(&encoded).await;
            prop_assert_eq!(decoded, text);
            Ok(())
        })?;
    }

    /// Decode is the identity on text that carries no tokens.
    #[test]
    fn decode_is_identity_without_tokens(text in "[^\\[\\]]{0,200}") {
        prop_assume!(token_pattern().find(&text).is_none());

        let rt = Runtime::new().expect("runtime");
        rt.block_on(async {
            let dir = tempdir().unwrap();
            let engine = engine_in(&dir).await;
            prop_assert_eq!(engine.decode(&text).await, text);
            Ok(())
        })?;
    }

    /// Unknown tokens survive decode unchanged rather than erroring.
    #[test]
    fn unknown_tokens_fail_open(suffix in "[0-9A-F]{8}", entity_type in entity_type_strategy()) {
        let text = format!("value: [{}_{}]", entity_type.as_str(), suffix);

        let rt = Runtime::new().expect("runtime");
        rt.block_on(async {
            let dir = tempdir().unwrap();
            let engine = engine_in(&dir).await;
            prop_assert_eq!(engine.decode(&text).await, text);
            Ok(())
        })?;
    }
}
