//! LLM-based classifier.
//!
//! Sends the question to the generation service under a fixed instruction
//! template with worked examples and parses an `IR: yes` / `IR: no`
//! verdict. An unparseable reply is an error, not a guess — the dialogue
//! controller maps classifier errors to the no-retrieval path.

use async_trait::async_trait;
use newsdesk_core::error::ClassifierError;
use newsdesk_core::{Generator, RetrievalNeedClassifier};
use std::sync::Arc;
use tracing::debug;

/// Instruction template with worked examples. The model must answer with
/// only `IR: yes` or `IR: no`.
const IR_CHECK_TEMPLATE: &str = "\
You are a specialized assistant for technology news, particularly recent advancements and industry updates.

Determine if the question requires time-sensitive information:
- If the question is about recent events, releases, or updates in technology, respond with `IR: yes`.
- For general technical knowledge that does not need updates, respond with `IR: no`.
- If unrelated (e.g., politics or entertainment), respond with `IR: no`.

Examples:
1. User question: 'What are the latest updates in AI research?' -> IR: yes
2. User question: 'Explain how neural networks work.' -> IR: no
3. User question: 'What happened last week in cybersecurity?' -> IR: yes
4. User question: 'Define blockchain technology.' -> IR: no
5. User question: 'Any news on the latest iPhone release?' -> IR: yes
6. User question: 'How does a quantum computer work?' -> IR: no
7. User question: 'What's trending in tech this month?' -> IR: yes
8. User question: 'Describe the process of software development.' -> IR: no
9. User question: 'Recent advancements in self-driving cars?' -> IR: yes
10. User question: 'What is the meaning of IoT?' -> IR: no

Answer with only `IR: yes` or `IR: no`.

User question: {question}
IR Decision:";

/// Classifier that delegates the yes/no judgment to an LLM.
pub struct LlmClassifier {
    generator: Arc<dyn Generator>,
}

impl LlmClassifier {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Parse the model's reply into a decision.
    ///
    /// Accepts the `IR: yes`/`IR: no` protocol plus bare `yes`/`no`, since
    /// instruction-tuned models sometimes drop the prefix.
    fn parse_verdict(reply: &str) -> std::result::Result<bool, ClassifierError> {
        let normalized = reply.trim().to_lowercase();
        let verdict = normalized
            .strip_prefix("ir:")
            .map(str::trim)
            .unwrap_or(normalized.as_str());

        match verdict {
            v if v.starts_with("yes") => Ok(true),
            v if v.starts_with("no") => Ok(false),
            _ => Err(ClassifierError::UnparseableVerdict(reply.to_string())),
        }
    }
}

#[async_trait]
impl RetrievalNeedClassifier for LlmClassifier {
    fn name(&self) -> &str {
        "llm"
    }

    async fn needs_retrieval(
        &self,
        question: &str,
    ) -> std::result::Result<bool, ClassifierError> {
        let prompt = IR_CHECK_TEMPLATE.replace("{question}", question);

        let reply = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        let decision = Self::parse_verdict(&reply)?;
        debug!(needs_retrieval = decision, "LLM classification");
        Ok(decision)
    }
}
