use semsearch_core::config::EmbeddingSettings;
use semsearch_core::error::EmbedError;
use semsearch_core::traits::{EmbedOptions, EmbedProvider};
use semsearch_embed::provider_from_settings;

#[tokio::test]
async fn mock_provider_shapes_and_determinism() {
    let embedder = provider_from_settings(&EmbeddingSettings::default()).expect("embedder");
    let texts = vec!["ranch house".to_string(), "ranch house".to_string(), String::new()];
    let embs = embedder.embed(&texts, &EmbedOptions::default()).await.expect("embed");
    assert_eq!(embs.len(), texts.len(), "one vector per input");

    let v1 = &embs[0];
    let v2 = &embs[1];
    assert_eq!(v1.len(), 768, "embedding dim is 768");

    // Norm approximately 1.0
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-5, "vector is L2-normalized (norm={norm})");

    // Deterministic for same input
    assert_eq!(v1, v2);

    // Empty input stays the zero vector
    assert!(embs[2].iter().all(|x| *x == 0.0));
}

#[tokio::test]
async fn vendor_without_credentials_fails_before_any_request() {
    let settings = EmbeddingSettings { provider: "openai".into(), api_key: None, ..EmbeddingSettings::default() };
    let embedder = provider_from_settings(&settings).expect("embedder");
    let err = embedder
        .embed(&["ranch house".to_string()], &EmbedOptions { tenant_id: Some("t1".into()), model: None })
        .await
        .expect_err("no credentials");
    assert!(matches!(err, EmbedError::Config(_)));
}
