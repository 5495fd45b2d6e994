//! # Newsdesk Core
//!
//! Domain types, traits, and error definitions for the newsdesk
//! retrieval-augmented chat runtime. This crate has **zero framework
//! dependencies** — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (search index, embedding service,
//! generation service, intent classifier) is defined as a trait here.
//! Implementations live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod turn;
pub mod persona;
pub mod evidence;
pub mod retriever;
pub mod classifier;
pub mod generate;
pub mod event;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use turn::{Turn, Role, Conversation, SessionId};
pub use persona::Persona;
pub use evidence::EvidenceDocument;
pub use retriever::Retriever;
pub use classifier::RetrievalNeedClassifier;
pub use generate::{Generator, Embedder};
pub use event::{TurnEvent, EventBus};
