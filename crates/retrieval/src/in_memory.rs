//! In-memory retriever — useful for testing and the offline doctor check.

use async_trait::async_trait;
use newsdesk_core::error::RetrievalError;
use newsdesk_core::{EvidenceDocument, Retriever};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::vector::cosine_similarity;

/// An article held by the in-memory index.
#[derive(Debug, Clone)]
pub struct IndexedArticle {
    pub title: String,
    pub text: String,
    pub source: String,
    pub url: String,
    /// Optional dense vector; articles without one fall back to keyword scoring.
    pub embedding: Option<Vec<f32>>,
}

/// A retriever that ranks a Vec of articles by cosine similarity to a
/// query embedding, with keyword containment as the fallback signal.
pub struct InMemoryRetriever {
    articles: Arc<RwLock<Vec<IndexedArticle>>>,
    /// Embedding used for every query; tests set this to steer ranking.
    query_embedding: Option<Vec<f32>>,
}

impl InMemoryRetriever {
    pub fn new() -> Self {
        Self {
            articles: Arc::new(RwLock::new(Vec::new())),
            query_embedding: None,
        }
    }

    /// Fix the embedding applied to all queries (no embedding service here).
    pub fn with_query_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.query_embedding = Some(embedding);
        self
    }

    /// Add an article to the index.
    pub async fn index(&self, article: IndexedArticle) {
        self.articles.write().await.push(article);
    }

    fn keyword_score(query: &str, article: &IndexedArticle) -> f32 {
        let query_lower = query.to_lowercase();
        let haystack = format!("{}\n{}", article.title, article.text).to_lowercase();
        let hits = query_lower
            .split_whitespace()
            .filter(|w| haystack.contains(*w))
            .count();
        hits as f32 / query_lower.split_whitespace().count().max(1) as f32
    }
}

impl Default for InMemoryRetriever {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Retriever for InMemoryRetriever {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<EvidenceDocument>, RetrievalError> {
        let articles = self.articles.read().await;

        let mut scored: Vec<(f32, EvidenceDocument)> = articles
            .iter()
            .filter_map(|article| {
                let score = match (&self.query_embedding, &article.embedding) {
                    (Some(q), Some(e)) => cosine_similarity(q, e),
                    _ => Self::keyword_score(query, article),
                };
                if score <= 0.0 {
                    return None;
                }
                Some((
                    score,
                    EvidenceDocument::new(
                        article.title.clone(),
                        article.text.clone(),
                        article.source.clone(),
                        article.url.clone(),
                        score,
                    ),
                ))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored.into_iter().map(|(_, doc)| doc).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, text: &str, embedding: Option<Vec<f32>>) -> IndexedArticle {
        IndexedArticle {
            title: title.into(),
            text: text.into(),
            source: "TestWire".into(),
            url: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
            embedding,
        }
    }

    #[tokio::test]
    async fn keyword_search_ranks_matches_first() {
        let retriever = InMemoryRetriever::new();
        retriever.index(article("Rust 2.0 released", "Big release for Rust.", None)).await;
        retriever.index(article("Gardening tips", "Water your plants.", None)).await;

        let results = retriever.search("rust release", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Rust 2.0 released");
    }

    #[tokio::test]
    async fn vector_search_orders_by_similarity() {
        let retriever = InMemoryRetriever::new().with_query_embedding(vec![1.0, 0.0]);
        retriever.index(article("Orthogonal", "far", Some(vec![0.0, 1.0]))).await;
        retriever.index(article("Aligned", "near", Some(vec![1.0, 0.0]))).await;
        retriever.index(article("Between", "mid", Some(vec![0.5, 0.5]))).await;

        let results = retriever.search("anything", 5).await.unwrap();
        assert_eq!(results[0].title, "Aligned");
        assert_eq!(results[1].title, "Between");
        // orthogonal scores 0 and is filtered out
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn respects_top_k() {
        let retriever = InMemoryRetriever::new();
        for i in 0..10 {
            retriever.index(article(&format!("AI story {i}"), "AI news item", None)).await;
        }

        let results = retriever.search("AI", 3).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn empty_index_returns_empty_list() {
        let retriever = InMemoryRetriever::new();
        let results = retriever.search("anything", 5).await.unwrap();
        assert!(results.is_empty());
    }
}
