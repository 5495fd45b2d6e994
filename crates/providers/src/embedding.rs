//! HTTP embedding client.
//!
//! Talks to an OpenAI-compatible `/embeddings` endpoint: model + input
//! text in, dense vector out. Used by the Elasticsearch retriever to
//! vectorize queries before the hybrid search.

use async_trait::async_trait;
use newsdesk_core::error::EmbeddingError;
use newsdesk_core::Embedder;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// An embedding service client.
pub struct HttpEmbedder {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    deadline: Duration,
}

impl HttpEmbedder {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        deadline: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(deadline)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
            deadline,
        }
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn name(&self) -> &str {
        "http"
    }

    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/embeddings", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        debug!(model = %self.model, chars = text.len(), "Sending embedding request");

        let response = tokio::time::timeout(
            self.deadline,
            self.client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send(),
        )
        .await
        .map_err(|_| EmbeddingError::Timeout {
            timeout_secs: self.deadline.as_secs(),
        })?
        .map_err(|e| EmbeddingError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let parsed: EmbeddingResponse =
            response.json().await.map_err(|e| EmbeddingError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(EmbeddingError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parsing_takes_first_vector() {
        let raw = r#"{"data":[{"embedding":[0.1,0.2,0.3]},{"embedding":[0.4]}]}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        let first = parsed.data.into_iter().next().unwrap().embedding;
        assert_eq!(first, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn base_url_is_normalized() {
        let embedder = HttpEmbedder::new(
            "https://api.example.com/v1///",
            "sk-test",
            "text-embedding-3-small",
            Duration::from_secs(10),
        );
        assert_eq!(embedder.base_url, "https://api.example.com/v1");
    }
}
