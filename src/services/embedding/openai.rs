//! OpenAI-compatible embedding client
//!
//! Talks to any server exposing `POST {base}/embeddings` with the OpenAI
//! request shape (OpenAI itself, text-embeddings-inference, vLLM, Ollama's
//! compatibility layer). Used only during catalog load.

use crate::{
    error::{AppError, AppResult},
    services::embedding::TextEmbedder,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone)]
pub struct OpenAiEmbedder {
    http_client: HttpClient,
    endpoint: String,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        model: String,
        dimensions: usize,
        batch_size: usize,
        timeout: Duration,
    ) -> AppResult<Self> {
        if model.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "embedding model name is empty".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) {
            let auth = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|_| AppError::InvalidInput("invalid embedding API key".to_string()))?;
            headers.insert(AUTHORIZATION, auth);
        }

        let http_client = HttpClient::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            endpoint: embeddings_endpoint(base_url),
            model,
            dimensions,
            batch_size,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn embeddings_endpoint(base_url: &str) -> String {
    format!("{}/embeddings", base_url.trim_end_matches('/'))
}

/// Orders response rows by their input index and checks there is one per input
fn collect_embeddings(mut response: EmbeddingResponse, expected: usize) -> AppResult<Vec<Vec<f32>>> {
    response.data.sort_by_key(|entry| entry.index);

    if response.data.len() != expected {
        return Err(AppError::Embedding(format!(
            "embedding endpoint returned {} vectors for {} inputs",
            response.data.len(),
            expected
        )));
    }

    Ok(response.data.into_iter().map(|entry| entry.embedding).collect())
}

#[async_trait::async_trait]
impl TextEmbedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            count = texts.len(),
            model = %self.model,
            "Requesting embeddings"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!(
                "embedding endpoint returned status {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response.json().await?;
        collect_embeddings(parsed, texts.len())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn name(&self) -> &'static str {
        "openai-compatible"
    }
}
