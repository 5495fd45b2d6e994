//! Retrieval-need classifier trait.
//!
//! Decides whether a question needs fresh evidence from the index or can
//! be answered from general knowledge. The concrete strategy has been
//! swapped several times (keyword heuristic, instruction-tuned model,
//! LLM yes/no judgment), so it is a single capability interface and any
//! implementation is a drop-in adapter selected by configuration.
//!
//! The controller — not the classifier — special-cases short inputs:
//! questions of two or fewer tokens never reach `needs_retrieval`.

use async_trait::async_trait;
use crate::error::ClassifierError;

/// The classification capability: text in, yes/no out.
///
/// Implementations should be deterministic enough that the same input
/// repeatedly yields the same decision under an unchanged model snapshot.
/// A failure here is safe: the controller defaults to no-retrieval.
#[async_trait]
pub trait RetrievalNeedClassifier: Send + Sync {
    /// A human-readable name for this classifier (e.g., "keyword", "llm").
    fn name(&self) -> &str;

    /// Does this question require retrieving time-sensitive information?
    async fn needs_retrieval(
        &self,
        question: &str,
    ) -> std::result::Result<bool, ClassifierError>;
}
