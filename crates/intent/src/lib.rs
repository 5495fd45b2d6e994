//! Retrieval-need classifier implementations for newsdesk.
//!
//! The classification strategy has been swapped several times over the
//! system's life (rule heuristic, instruction-tuned seq2seq model, LLM
//! yes/no judgment), so each strategy is a drop-in adapter behind the
//! core `RetrievalNeedClassifier` trait, selected by configuration.

pub mod keyword;
pub mod llm;
pub mod fixed;

pub use keyword::KeywordClassifier;
pub use llm::LlmClassifier;
pub use fixed::FixedClassifier;
