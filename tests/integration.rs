//! Integration tests for the tokenization pipeline.
//!
//! These run end-to-end against the in-process and file tiers only - no
//! external services. Redis-backed paths are covered by the `redis_*`
//! tests at the bottom, which require a local Redis and are `#[ignore]`d.
//!
//! # Running Tests
//! ```bash
//! cargo test --test integration
//!
//! # With a local Redis on 6379
//! cargo test --test integration redis -- --ignored
//! ```

use std::sync::Arc;

use serde_json::json;
use tempfile::tempdir;

use pii_vault::{
    token_pattern, DetectError, EngineConfig, EntityType, PiiEngine, QueryResult, Recognizer, Span,
};

fn test_config(dir: &tempfile::TempDir) -> EngineConfig {
    EngineConfig {
        fallback_path: dir.path().join("store.json").to_string_lossy().into_owned(),
        ..Default::default()
    }
}

async fn pattern_engine(dir: &tempfile::TempDir) -> PiiEngine {
    PiiEngine::from_config(&test_config(dir), None)
        .await
        .expect("engine init")
}

/// Recognizer returning a fixed span set, for offset-controlled tests.
struct FixedRecognizer(Vec<Span>);

#[async_trait::async_trait]
impl Recognizer for FixedRecognizer {
    async fn analyze(&self, _text: &str) -> Result<Vec<Span>, DetectError> {
        Ok(self.0.clone())
    }
}

// =============================================================================
// Round Trip - Free Text
// =============================================================================

#[tokio::test]
async fn roundtrip_contact_scenario() {
    let dir = tempdir().unwrap();
    let engine = pattern_engine(&dir).await;

    let text = "please contact John Smith at john.smith@example.com";
    let (encoded, mappings) = engine.encode(text).await.unwrap();

    // PERSON first in text order, EMAIL_ADDRESS second
    assert_eq!(mappings.len(), 2);
    assert_eq!(mappings[0].entity_type, EntityType::Person);
    assert_eq!(mappings[1].entity_type, EntityType::EmailAddress);

    assert!(encoded.starts_with("please contact [PERSON_"));
    assert!(encoded.contains(" at [EMAIL_ADDRESS_"));
    assert!(!encoded.contains("John Smith"));
    assert!(!encoded.contains("example.com"));

    assert_eq!(engine.decode(&encoded).await, text);
}

#[tokio::test]
async fn roundtrip_with_repeated_value() {
    let dir = tempdir().unwrap();
    let engine = pattern_engine(&dir).await;

    let text = "Jane Doe emailed Jane Doe";
    let (encoded, mappings) = engine.encode(text).await.unwrap();

    // Same value, same token, both occurrences substituted
    assert_eq!(mappings.len(), 2);
    assert_eq!(mappings[0].token, mappings[1].token);
    assert_eq!(engine.decode(&encoded).await, text);
}

#[tokio::test]
async fn roundtrip_unicode_text() {
    let dir = tempdir().unwrap();
    let engine = pattern_engine(&dir).await;

    let text = "café visitors: John Smith, σήμερα jane@x.com";
    let (encoded, _) = engine.encode(text).await.unwrap();
    assert_eq!(engine.decode(&encoded).await, text);
}

#[tokio::test]
async fn clean_text_is_untouched_both_ways() {
    let dir = tempdir().unwrap();
    let engine = pattern_engine(&dir).await;

    let text = "select total from orders where qty > 5";
    let (encoded, mappings) = engine.encode(text).await.unwrap();
    assert_eq!(encoded, text);
    assert!(mappings.is_empty());
    assert_eq!(engine.decode(text).await, text);
}

// =============================================================================
// Offset Safety
// =============================================================================

#[tokio::test]
async fn offset_safety_adjacent_spans_of_varying_length() {
    //            0123456789...
    let text = "AA BBBB CCCCCCCC DD";
    let spans = vec![
        Span::new(EntityType::Person, 0, 2, 0.9),
        Span::new(EntityType::Organization, 3, 7, 0.9),
        Span::new(EntityType::Location, 8, 16, 0.9),
        Span::new(EntityType::NationalId, 17, 19, 0.9),
    ];

    let dir = tempdir().unwrap();
    let engine = PiiEngine::from_config(
        &test_config(&dir),
        Some(Arc::new(FixedRecognizer(spans)) as Arc<dyn Recognizer>),
    )
    .await
    .unwrap();

    let (encoded, mappings) = engine.encode(text).await.unwrap();
    assert_eq!(mappings.len(), 4);
    // Token lengths differ wildly from original span lengths; decode must
    // still restore the exact input.
    assert_eq!(engine.decode(&encoded).await, text);

    // Spacing between substitutions survived
    assert!(encoded.contains("] ["));
}

// =============================================================================
// Tabular Results
// =============================================================================

#[tokio::test]
async fn roundtrip_tabular_result() {
    let dir = tempdir().unwrap();
    let engine = pattern_engine(&dir).await;

    let result: QueryResult = serde_json::from_value(json!({
        "columns": ["name", "email"],
        "rows": [["Jane Doe", "jane@x.com"]],
        "row_count": 1
    }))
    .unwrap();

    let encoded = engine.encode_results(&result).await.unwrap();

    // Intermediate form carries two bracketed tokens
    let intermediate = serde_json::to_string(&encoded).unwrap();
    assert_eq!(token_pattern().find_iter(&intermediate).count(), 2);

    let decoded = engine.decode_results(&encoded).await;
    assert_eq!(decoded, result);
}

#[tokio::test]
async fn roundtrip_record_list_result() {
    let dir = tempdir().unwrap();
    let engine = pattern_engine(&dir).await;

    let result: QueryResult = serde_json::from_value(json!([
        {"customer": "John Smith", "total": 120.5},
        {"customer": "Jane Doe", "total": 88.0}
    ]))
    .unwrap();

    let encoded = engine.encode_results(&result).await.unwrap();
    let decoded = engine.decode_results(&encoded).await;
    assert_eq!(decoded, result);
}

#[tokio::test]
async fn non_string_cells_pass_through() {
    let dir = tempdir().unwrap();
    let engine = pattern_engine(&dir).await;

    let result: QueryResult = serde_json::from_value(json!({
        "columns": ["id", "active", "note"],
        "rows": [[17, true, null]],
        "row_count": 1
    }))
    .unwrap();

    let encoded = engine.encode_results(&result).await.unwrap();
    assert_eq!(encoded, result);
}

// =============================================================================
// Failure Modes
// =============================================================================

#[tokio::test]
async fn fail_open_on_unknown_token() {
    let dir = tempdir().unwrap();
    let engine = pattern_engine(&dir).await;

    let text = "result: [PERSON_DEADBEEF] (unresolved)";
    assert_eq!(engine.decode(text).await, text);
}

#[tokio::test]
async fn fail_open_after_key_rotation() {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use pii_vault::CipherVault;

    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json").to_string_lossy().into_owned();

    // Encode under key A; the mapping lands in the file tier
    let config_a = EngineConfig {
        encryption_key: Some(STANDARD.encode(CipherVault::generate_key())),
        fallback_path: path.clone(),
        ..Default::default()
    };
    let engine_a = PiiEngine::from_config(&config_a, None).await.unwrap();
    let (encoded, _) = engine_a.encode("mail jane@x.com now").await.unwrap();

    // A fresh process under key B finds the ciphertext but cannot decrypt:
    // the token stays in place rather than erroring or leaking
    let config_b = EngineConfig {
        encryption_key: Some(STANDARD.encode(CipherVault::generate_key())),
        fallback_path: path,
        ..Default::default()
    };
    let engine_b = PiiEngine::from_config(&config_b, None).await.unwrap();
    assert_eq!(engine_b.decode(&encoded).await, encoded);
}

#[tokio::test]
async fn mappings_survive_process_restart_via_file_tier() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json").to_string_lossy().into_owned();
    let key = {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        use pii_vault::CipherVault;
        STANDARD.encode(CipherVault::generate_key())
    };

    let config = EngineConfig {
        encryption_key: Some(key),
        fallback_path: path,
        ..Default::default()
    };

    let (encoded, text) = {
        let engine = PiiEngine::from_config(&config, None).await.unwrap();
        let text = "Contact John Smith at john.smith@example.com";
        (engine.encode(text).await.unwrap().0, text)
    };

    // "Restart": a second engine with the same key and fallback file
    let engine = PiiEngine::from_config(&config, None).await.unwrap();
    assert_eq!(engine.decode(&encoded).await, text);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn concurrent_encode_decode() {
    let dir = tempdir().unwrap();
    let engine = Arc::new(pattern_engine(&dir).await);

    let mut handles = vec![];
    for i in 0..16 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let text = format!("request {}: mail user{}@example.com", i, i);
            let (encoded, _) = engine.encode(&text).await.unwrap();
            assert_eq!(engine.decode(&encoded).await, text);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(engine.store().snapshot().len(), 16);
}

// =============================================================================
// Redis-backed paths (require a local Redis on 6379)
// =============================================================================

#[tokio::test]
#[ignore] // Requires a local Redis
async fn redis_roundtrip_through_external_tier() {
    let dir = tempdir().unwrap();
    let config = EngineConfig {
        redis_url: Some("redis://127.0.0.1:6379".into()),
        redis_prefix: format!("pii-test-{}:", std::process::id()),
        ..test_config(&dir)
    };

    let engine = PiiEngine::from_config(&config, None).await.unwrap();
    let text = "Contact John Smith at john.smith@example.com";
    let (encoded, _) = engine.encode(text).await.unwrap();

    // Clear the in-process tier: decode must resolve through Redis
    engine.store().memory().clear();
    assert_eq!(engine.decode(&encoded).await, text);
}
