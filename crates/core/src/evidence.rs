//! Evidence documents — retrieved passages used to ground an answer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single retrieved document with its source metadata and the score the
/// search backend assigned to it. Produced fresh per retrieval call and
/// never mutated; it lives for one request and is never written into the
/// conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceDocument {
    /// Article title
    pub title: String,

    /// Body text (title/description/content concatenated by the adapter)
    pub text: String,

    /// Publisher name (e.g., "TechCrunch")
    pub source: String,

    /// Link to the original article
    pub url: String,

    /// Publication timestamp, if the index has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,

    /// Backend-assigned relevance score (higher is better)
    pub relevance_score: f32,
}

impl EvidenceDocument {
    /// Build a minimal document; used by tests and the in-memory retriever.
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        source: impl Into<String>,
        url: impl Into<String>,
        relevance_score: f32,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            source: source.into(),
            url: url.into(),
            published_at: None,
            relevance_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_skips_missing_timestamp() {
        let doc = EvidenceDocument::new(
            "Quantum leap",
            "A new qubit record was set.",
            "TechDaily",
            "https://example.com/qubits",
            1.8,
        );
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("published_at"));
        assert!(json.contains("TechDaily"));
    }
}
