//! Retriever trait — the abstraction over the document search backend.
//!
//! A Retriever turns a natural-language query into a ranked list of
//! evidence documents. The controller treats any failure here as "no
//! evidence found" and degrades; retrieval must never abort a turn.
//!
//! Implementations: Elasticsearch hybrid search, in-memory (for tests
//! and the doctor command).

use async_trait::async_trait;
use crate::error::RetrievalError;
use crate::evidence::EvidenceDocument;

/// The core Retriever trait.
///
/// The returned list is ordered by descending `relevance_score`, holds at
/// most `top_k` entries, and may be empty — an empty list is a valid
/// answer ("the index has nothing relevant"), not an error.
///
/// Implementations must be idempotent for identical query text at a fixed
/// index state, and must enforce their own per-call deadline so a hung
/// backend cannot stall the turn.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// A human-readable name for this retriever (e.g., "elasticsearch").
    fn name(&self) -> &str;

    /// Search the index for documents relevant to `query`.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<EvidenceDocument>, RetrievalError>;
}
