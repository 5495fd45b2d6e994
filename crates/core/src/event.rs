//! Turn event system — the controller's observability hook.
//!
//! The dialogue controller publishes structured events at defined points
//! of a turn (classification, pre/post retrieval, pre-generation, turn
//! completion). Debug tooling subscribes here instead of the controller
//! doing inline I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Which prompt path a turn was answered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnsweredPath {
    Retrieval,
    General,
    NoEvidence,
    ShortInput,
}

/// All turn events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TurnEvent {
    /// A question arrived at the controller
    QuestionReceived {
        session_id: String,
        question_preview: String,
        timestamp: DateTime<Utc>,
    },

    /// The retrieval-need classifier produced a decision
    RetrievalDecision {
        session_id: String,
        needs_retrieval: bool,
        classifier: String,
        timestamp: DateTime<Utc>,
    },

    /// Retrieval is about to run
    RetrievalStarted {
        session_id: String,
        query: String,
        timestamp: DateTime<Utc>,
    },

    /// Retrieval finished (possibly empty, possibly degraded)
    RetrievalFinished {
        session_id: String,
        documents: usize,
        degraded: bool,
        timestamp: DateTime<Utc>,
    },

    /// A prompt was composed and is about to be sent for generation
    PromptComposed {
        session_id: String,
        path: AnsweredPath,
        prompt_chars: usize,
        timestamp: DateTime<Utc>,
    },

    /// The turn completed with an answer
    TurnCompleted {
        session_id: String,
        path: AnsweredPath,
        answer_chars: usize,
        timestamp: DateTime<Utc>,
    },

    /// The turn failed (generation error; history untouched)
    TurnFailed {
        session_id: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for turn events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub. Components
/// subscribe to receive all events and filter for what they care about.
pub struct EventBus {
    sender: broadcast::Sender<Arc<TurnEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: TurnEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<TurnEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(TurnEvent::RetrievalFinished {
            session_id: "s1".into(),
            documents: 3,
            degraded: false,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            TurnEvent::RetrievalFinished { documents, degraded, .. } => {
                assert_eq!(*documents, 3);
                assert!(!degraded);
            }
            _ => panic!("Expected RetrievalFinished event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(TurnEvent::TurnFailed {
            session_id: "s1".into(),
            error_message: "no subscribers".into(),
            timestamp: Utc::now(),
        });
    }
}
