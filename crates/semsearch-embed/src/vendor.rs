//! Remote embedding provider speaking the OpenAI-compatible embeddings API.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use semsearch_core::config::EmbeddingSettings;
use semsearch_core::error::EmbedError;
use semsearch_core::traits::{EmbedOptions, EmbedProvider};
use semsearch_core::types::EmbeddingVector;

pub struct VendorEmbedder {
    client: reqwest::Client,
    api_url: Option<String>,
    api_key: Option<String>,
    model: String,
    dim: usize,
    id: String,
}

impl VendorEmbedder {
    pub fn new(settings: &EmbeddingSettings) -> Result<Self, EmbedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.timeout_secs.min(10)))
            .build()
            .map_err(|e| EmbedError::Upstream(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_url: settings.api_url.clone().filter(|u| !u.trim().is_empty()),
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: settings.model.clone(),
            dim: settings.dimension,
            id: format!("openai:{}", settings.model),
        })
    }

    async fn send(&self, url: &str, key: &str, payload: &Value) -> Result<Value, EmbedError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(key)
            .json(payload)
            .send()
            .await
            .map_err(|e| EmbedError::Upstream(format!("HTTP request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbedError::Upstream(format!("HTTP error {status}: {body}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| EmbedError::Upstream(format!("invalid JSON response: {e}")))
    }
}

#[async_trait]
impl EmbedProvider for VendorEmbedder {
    fn provider_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }

    async fn embed(&self, texts: &[String], options: &EmbedOptions) -> Result<Vec<EmbeddingVector>, EmbedError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| EmbedError::Config("embedding.api_key is required for the remote provider".into()))?;
        let url = self
            .api_url
            .as_deref()
            .ok_or_else(|| EmbedError::Config("embedding.api_url is required for the remote provider".into()))?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = options.model.as_deref().unwrap_or(&self.model);
        let payload = build_payload(texts, model);
        tracing::debug!(provider = %self.id, model, count = texts.len(), "requesting embeddings");
        let vectors = parse_embeddings(self.send(url, key, &payload).await?)?;
        if vectors.len() != texts.len() {
            return Err(EmbedError::Upstream(format!(
                "API returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

fn build_payload(texts: &[String], model: &str) -> Value {
    json!({ "input": texts, "model": model })
}

/// Accepts `{"data":[{"embedding":[..],"index":n}]}` or `{"embeddings":[[..]]}`.
fn parse_embeddings(value: Value) -> Result<Vec<EmbeddingVector>, EmbedError> {
    let Value::Object(mut map) = value else {
        return Err(EmbedError::Upstream("unsupported API response shape".into()));
    };

    if let Some(Value::Array(items)) = map.remove("data") {
        let mut indexed = Vec::with_capacity(items.len());
        for (position, item) in items.into_iter().enumerate() {
            let Value::Object(mut obj) = item else {
                return Err(EmbedError::Upstream("unexpected entry inside `data` array".into()));
            };
            let index = obj.get("index").and_then(Value::as_u64).map_or(position, |i| i as usize);
            let embedding = obj
                .remove("embedding")
                .ok_or_else(|| EmbedError::Upstream("missing `embedding` field in data item".into()))?;
            indexed.push((index, parse_vector(embedding)?));
        }
        indexed.sort_by_key(|(index, _)| *index);
        return Ok(indexed.into_iter().map(|(_, v)| v).collect());
    }

    if let Some(Value::Array(items)) = map.remove("embeddings") {
        return items.into_iter().map(parse_vector).collect();
    }

    Err(EmbedError::Upstream("unsupported API response shape".into()))
}

fn parse_vector(value: Value) -> Result<EmbeddingVector, EmbedError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| EmbedError::Upstream("non-finite embedding value".into())),
                other => Err(EmbedError::Upstream(format!("embedding entries must be numbers, got {other}"))),
            })
            .collect(),
        other => Err(EmbedError::Upstream(format!("embedding vector must be an array, got {other}"))),
    }
}
