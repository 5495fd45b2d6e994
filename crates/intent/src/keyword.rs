//! Keyword heuristic classifier.
//!
//! A question needs retrieval when it carries a recency marker ("latest",
//! "news", "this week", ...). Fully deterministic and dependency-free;
//! the default classifier for deployments that do not want an extra LLM
//! call per turn.

use async_trait::async_trait;
use newsdesk_core::error::ClassifierError;
use newsdesk_core::RetrievalNeedClassifier;
use tracing::debug;

/// Markers that indicate a question is about recent or time-sensitive
/// events rather than general technical knowledge.
const RECENCY_MARKERS: &[&str] = &[
    "latest",
    "news",
    "recent",
    "recently",
    "today",
    "yesterday",
    "this week",
    "this month",
    "this year",
    "last week",
    "last month",
    "update",
    "updates",
    "release",
    "released",
    "announcement",
    "announced",
    "launch",
    "launched",
    "trending",
    "breaking",
    "new in",
    "what's new",
    "whats new",
    "just out",
    "happened",
];

/// Rule-based retrieval-need classifier.
pub struct KeywordClassifier {
    markers: Vec<String>,
}

impl KeywordClassifier {
    pub fn new() -> Self {
        Self {
            markers: RECENCY_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Extend the marker list (e.g. from config).
    pub fn with_extra_markers(mut self, extra: impl IntoIterator<Item = String>) -> Self {
        self.markers.extend(extra.into_iter().map(|m| m.to_lowercase()));
        self
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RetrievalNeedClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn needs_retrieval(
        &self,
        question: &str,
    ) -> std::result::Result<bool, ClassifierError> {
        let lowered = question.to_lowercase();
        let needs = self.markers.iter().any(|m| lowered.contains(m.as_str()));
        debug!(needs_retrieval = needs, "Keyword classification");
        Ok(needs)
    }
}
