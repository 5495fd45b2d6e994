//! Fixed classifier — always yes or always no.
//!
//! Used by tests and the doctor command to force a path through the
//! controller without a model in the loop.

use async_trait::async_trait;
use newsdesk_core::error::ClassifierError;
use newsdesk_core::RetrievalNeedClassifier;

/// A classifier with a constant verdict.
pub struct FixedClassifier {
    verdict: bool,
}

impl FixedClassifier {
    pub fn always(verdict: bool) -> Self {
        Self { verdict }
    }
}

#[async_trait]
impl RetrievalNeedClassifier for FixedClassifier {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn needs_retrieval(
        &self,
        _question: &str,
    ) -> std::result::Result<bool, ClassifierError> {
        Ok(self.verdict)
    }
}
