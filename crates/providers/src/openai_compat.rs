//! OpenAI-compatible generation client.
//!
//! Works with OpenAI, OpenRouter, Ollama, vLLM, and any endpoint exposing
//! a `/v1/chat/completions` route. The dialogue controller supplies the
//! whole context inside one prompt, so every request carries a single
//! user message and the service stays stateless across calls.

use async_trait::async_trait;
use newsdesk_core::error::GenerationError;
use newsdesk_core::Generator;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// An OpenAI-compatible completion client.
pub struct OpenAiCompatGenerator {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
    deadline: Duration,
}

impl OpenAiCompatGenerator {
    /// Create a new OpenAI-compatible generator.
    pub fn new(
        name: impl Into<String>,
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
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: 1024,
            client,
            deadline,
        }
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>, deadline: Duration) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key, model, deadline)
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion token cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

#[async_trait]
impl Generator for OpenAiCompatGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "stream": false,
        });

        debug!(provider = %self.name, model = %self.model, "Sending completion request");

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
        .map_err(|_| GenerationError::Timeout {
            timeout_secs: self.deadline.as_secs(),
        })?
        .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(GenerationError::RateLimited { retry_after_secs: 5 });
        }

        if status == 401 || status == 403 {
            return Err(GenerationError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(GenerationError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| GenerationError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let completion = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if completion.trim().is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }

        Ok(completion)
    }
}
