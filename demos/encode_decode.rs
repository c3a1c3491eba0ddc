//! End-to-end demo: encode a sentence and a tabular result, then decode.
//!
//! ```bash
//! cargo run --example encode_decode
//!
//! # Against a local Redis
//! PII_REDIS_URL=redis://127.0.0.1:6379 cargo run --example encode_decode
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;

use pii_vault::{CipherVault, EngineConfig, PiiEngine, QueryResult};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pii_vault=debug".into()),
        )
        .init();

    let config = EngineConfig {
        redis_url: std::env::var("PII_REDIS_URL").ok(),
        encryption_key: Some(STANDARD.encode(CipherVault::generate_key())),
        fallback_path: "./.token_store.json".into(),
        ..Default::default()
    };

    // No model recognizer attached; the regex fallback carries detection
    let engine = PiiEngine::from_config(&config, None).await?;

    let text = "please contact John Smith at john.smith@example.com or +1 555 123 4567";
    let (encoded, mappings) = engine.encode(text).await?;

    println!("original:  {text}");
    println!("encoded:   {encoded}");
    for mapping in &mappings {
        println!(
            "  {} -> {} ({} bytes)",
            mapping.entity_type, mapping.token, mapping.original_len
        );
    }

    let decoded = engine.decode(&encoded).await;
    println!("decoded:   {decoded}");
    assert_eq!(decoded, text);

    // Tabular result, the shape a SQL layer hands back
    let result: QueryResult = serde_json::from_value(json!({
        "columns": ["name", "email"],
        "rows": [
            ["Jane Doe", "jane.doe@example.com"],
            ["John Smith", "john.smith@example.com"]
        ],
        "row_count": 2
    }))?;

    let encoded_result = engine.encode_results(&result).await?;
    println!("\nencoded result:\n{}", serde_json::to_string_pretty(&encoded_result)?);

    let decoded_result = engine.decode_results(&encoded_result).await;
    assert_eq!(decoded_result, result);
    println!("\nround trip ok, {} mappings stored", engine.store().snapshot().len());

    Ok(())
}
