//! Generator and Embedder traits — the abstractions over the LLM
//! completion service and the text-embedding service.
//!
//! Both are stateless request/response collaborators from the core's
//! point of view: the controller supplies all context inside the prompt,
//! and the embedding service maps text to a fixed-length vector.

use async_trait::async_trait;
use crate::error::{EmbeddingError, GenerationError};

/// Single-turn text completion: prompt in, completion out.
///
/// The service keeps no state across calls; conversation context travels
/// inside the prompt. A failure here has no safe fallback and is surfaced
/// to the caller as the turn's error.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this generator (e.g., "openai").
    fn name(&self) -> &str;

    /// Generate a completion for the fully-composed prompt.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError>;
}

/// Text embedding: text in, fixed-length vector out.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// A human-readable name for this embedder.
    fn name(&self) -> &str;

    /// Embed a single text into a dense vector.
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, EmbeddingError>;
}
