//! Shared scripted collaborators for controller and session tests.

use async_trait::async_trait;
use newsdesk_core::error::{ClassifierError, GenerationError, RetrievalError};
use newsdesk_core::{EvidenceDocument, Generator, Retriever, RetrievalNeedClassifier};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A generator that returns scripted replies in order and counts calls.
/// Panics if more calls are made than replies provided.
pub struct ScriptedGenerator {
    replies: Mutex<Vec<String>>,
    call_count: AtomicUsize,
    /// Prompts seen, for asserting on composed prompt content.
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
            call_count: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn single(reply: &str) -> Self {
        Self::new(vec![reply])
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        let replies = self.replies.lock().unwrap();
        if count >= replies.len() {
            panic!(
                "ScriptedGenerator: no more replies (call #{}, have {})",
                count,
                replies.len()
            );
        }
        Ok(replies[count].clone())
    }
}

/// A generator that always fails.
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Network("connection refused".into()))
    }
}

/// A classifier with a fixed verdict that counts how often it is asked.
pub struct CountingClassifier {
    verdict: Result<bool, ClassifierError>,
    call_count: AtomicUsize,
}

impl CountingClassifier {
    pub fn always(verdict: bool) -> Self {
        Self {
            verdict: Ok(verdict),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            verdict: Err(ClassifierError::Unavailable("model offline".into())),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RetrievalNeedClassifier for CountingClassifier {
    fn name(&self) -> &str {
        "counting"
    }

    async fn needs_retrieval(&self, _question: &str) -> Result<bool, ClassifierError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.verdict.clone()
    }
}

/// A retriever that returns a fixed document list (or a fixed error) and
/// records the queries it was given.
pub struct StaticRetriever {
    result: Result<Vec<EvidenceDocument>, RetrievalError>,
    pub queries: Mutex<Vec<String>>,
}

impl StaticRetriever {
    pub fn returning(documents: Vec<EvidenceDocument>) -> Self {
        Self {
            result: Ok(documents),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            result: Err(RetrievalError::Network("search backend down".into())),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn last_query(&self) -> Option<String> {
        self.queries.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<EvidenceDocument>, RetrievalError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.result.clone().map(|mut docs| {
            docs.truncate(top_k);
            docs
        })
    }
}

/// Two plausible news documents for retrieval-path tests.
pub fn sample_documents() -> Vec<EvidenceDocument> {
    vec![
        EvidenceDocument::new(
            "New reasoning model tops benchmarks",
            "A research lab released a model that leads several reasoning benchmarks.",
            "TechDaily",
            "https://example.com/reasoning-model",
            2.3,
        ),
        EvidenceDocument::new(
            "Chip startup raises funding",
            "An AI accelerator startup closed a large funding round.",
            "The Wire",
            "https://example.com/chip-funding",
            1.9,
        ),
    ]
}
