//! Embedding client for the sentence-embedding runtime
//!
//! Independent of the language model: this runtime can be absent or
//! broken without affecting answers; only semantic file search degrades.

use super::InferenceError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Seam for query embedding so the search path is testable without a
/// runtime.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, InferenceError>;
}

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint.
pub struct EmbeddingClient {
    http: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, InferenceError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Build(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Load-time probe; a failure here disables semantic search only.
    pub async fn probe(&self) -> Result<(), InferenceError> {
        let vector = self.embed("omni warm-up probe").await?;
        if vector.is_empty() {
            return Err(InferenceError::Malformed("empty embedding".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let response = self
            .http
            .post(format!("{}/v1/embeddings", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Malformed(e.to_string()))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|row| row.embedding)
            .ok_or_else(|| InferenceError::Malformed("empty embedding data".to_string()))
    }
}
