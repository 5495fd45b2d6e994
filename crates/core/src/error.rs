//! Error types for the newsdesk domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant. The dialogue
//! controller's fallback rules are written against these kinds:
//! retrieval and classification failures have safe degraded paths,
//! generation failures propagate for the turn, configuration errors
//! are fatal at startup.

use thiserror::Error;

/// The top-level error type for all newsdesk operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Retrieval errors (degrade, never abort the turn) ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Classifier errors (default to no-retrieval) ---
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    // --- Generation errors (surfaced to the caller for the turn) ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Embedding errors ---
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    // --- Input validation ---
    #[error("Validation error: {0}")]
    Validation(String),

    // --- Unknown or closed session handle ---
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    // --- Configuration errors (fatal at startup, not per-turn) ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Search backend request failed: {message} (status: {status_code})")]
    Backend {
        status_code: u16,
        message: String,
    },

    #[error("Malformed search response: {0}")]
    MalformedResponse(String),

    #[error("Query embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("Retrieval timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Unparseable classifier verdict: {0:?}")]
    UnparseableVerdict(String),

    #[error("Classification timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Empty completion from provider")]
    EmptyCompletion,

    #[error("Generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Empty embedding response")]
    EmptyResponse,

    #[error("Embedding timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),
}
