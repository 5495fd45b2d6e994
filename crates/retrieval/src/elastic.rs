//! Elasticsearch hybrid retriever.
//!
//! Issues a single `_search` request combining dense vector similarity
//! against the three embedded fields (`title_vector`, `description_vector`,
//! `content_vector`) with a boosted lexical `multi_match` over
//! `title^2, description^1.5, content`. The backend unions the clauses and
//! ranks by its combined score; we take the ranked hits as-is.
//!
//! Failures (transport, non-2xx, malformed body, deadline expiry) surface
//! as `RetrievalError` — the dialogue controller degrades to the
//! no-evidence path, it never crashes the turn.

use async_trait::async_trait;
use chrono::DateTime;
use newsdesk_core::error::RetrievalError;
use newsdesk_core::{Embedder, EvidenceDocument, Retriever};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A retriever backed by an Elasticsearch news index.
pub struct ElasticRetriever {
    base_url: String,
    index: String,
    username: Option<String>,
    password: Option<String>,
    embedder: Arc<dyn Embedder>,
    client: reqwest::Client,
    deadline: Duration,
}

impl ElasticRetriever {
    /// Create a new Elasticsearch retriever.
    ///
    /// `base_url` is the cluster root (e.g. `https://localhost:9200`);
    /// `index` is the news index name (e.g. `ai_news_01`).
    pub fn new(
        base_url: impl Into<String>,
        index: impl Into<String>,
        embedder: Arc<dyn Embedder>,
        deadline: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(deadline)
            .danger_accept_invalid_certs(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            index: index.into(),
            username: None,
            password: None,
            embedder,
            client,
            deadline,
        }
    }

    /// Set basic-auth credentials for the cluster.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Build the hybrid search body: three script-score cosine clauses
    /// (one per embedded field) unioned with a boosted keyword match.
    pub fn build_query(query: &str, query_vector: &[f32], top_k: usize) -> Value {
        let vector_clause = |field: &str| {
            json!({
                "script_score": {
                    "query": { "match_all": {} },
                    "script": {
                        "source": format!("cosineSimilarity(params.query_vector, '{field}') + 1.0"),
                        "params": { "query_vector": query_vector }
                    }
                }
            })
        };

        json!({
            "size": top_k,
            "query": {
                "bool": {
                    "should": [
                        vector_clause("title_vector"),
                        vector_clause("description_vector"),
                        vector_clause("content_vector"),
                        {
                            "multi_match": {
                                "query": query,
                                "fields": ["title^2", "description^1.5", "content"],
                                "type": "best_fields"
                            }
                        }
                    ]
                }
            }
        })
    }

    /// Map one search hit to an evidence document.
    ///
    /// The prompt wants one text blob per article, so title, description,
    /// and content are concatenated into `text`.
    fn hit_to_document(hit: &Value) -> Option<EvidenceDocument> {
        let source = hit.get("_source")?;
        let title = source["title"].as_str().unwrap_or("").to_string();
        let description = source["description"].as_str().unwrap_or("");
        let content = source["content"].as_str().unwrap_or("");

        let mut text = title.clone();
        for part in [description, content] {
            if !part.is_empty() {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(part);
            }
        }

        let published_at = source["publishedAt"]
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&chrono::Utc));

        Some(EvidenceDocument {
            title,
            text,
            source: source["source_name"].as_str().unwrap_or("unknown").to_string(),
            url: source["url"].as_str().unwrap_or("").to_string(),
            published_at,
            relevance_score: hit["_score"].as_f64().unwrap_or(0.0) as f32,
        })
    }
}

#[async_trait]
impl Retriever for ElasticRetriever {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<EvidenceDocument>, RetrievalError> {
        let query_vector = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| RetrievalError::EmbeddingFailed(e.to_string()))?;

        let body = Self::build_query(query, &query_vector, top_k);
        let url = format!("{}/{}/_search", self.base_url, self.index);

        debug!(index = %self.index, top_k, "Sending hybrid search request");

        let mut request = self.client.post(&url).json(&body);
        if let (Some(user), Some(pass)) = (&self.username, &self.password) {
            request = request.basic_auth(user, Some(pass));
        }

        let response = tokio::time::timeout(self.deadline, request.send())
            .await
            .map_err(|_| RetrievalError::Timeout {
                timeout_secs: self.deadline.as_secs(),
            })?
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Search backend returned error");
            return Err(RetrievalError::Backend {
                status_code: status,
                message: error_body,
            });
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| RetrievalError::MalformedResponse(e.to_string()))?;

        let hits = parsed["hits"]["hits"]
            .as_array()
            .ok_or_else(|| RetrievalError::MalformedResponse("missing hits.hits".into()))?;

        let documents: Vec<EvidenceDocument> =
            hits.iter().filter_map(Self::hit_to_document).collect();

        debug!(count = documents.len(), "Search returned documents");
        Ok(documents)
    }
}
