//! Retriever implementations for newsdesk.

pub mod elastic;
pub mod in_memory;
pub mod vector;

pub use elastic::ElasticRetriever;
pub use in_memory::{InMemoryRetriever, IndexedArticle};
pub use vector::cosine_similarity;
