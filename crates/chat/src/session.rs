//! Session registry — explicit lifecycle management for conversations.
//!
//! One lifecycle-managed map from session id to controller, with explicit
//! create/close. Each controller sits behind its own async mutex, so asks
//! against one session are strictly sequential while independent sessions
//! proceed concurrently.

use newsdesk_core::event::EventBus;
use newsdesk_core::{
    Error, Generator, Persona, Result, Retriever, RetrievalNeedClassifier, SessionId, Turn,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::controller::{ControllerOptions, DialogueController};
use crate::history::HistoryWindow;

/// Owns all live sessions and the collaborators new controllers need.
pub struct SessionRegistry {
    generator: Arc<dyn Generator>,
    classifier: Arc<dyn RetrievalNeedClassifier>,
    retriever: Option<Arc<dyn Retriever>>,
    event_bus: Arc<EventBus>,
    window: HistoryWindow,
    options: ControllerOptions,
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<DialogueController>>>>,
}

impl SessionRegistry {
    pub fn new(
        generator: Arc<dyn Generator>,
        classifier: Arc<dyn RetrievalNeedClassifier>,
        retriever: Option<Arc<dyn Retriever>>,
        event_bus: Arc<EventBus>,
        window: HistoryWindow,
        options: ControllerOptions,
    ) -> Self {
        Self {
            generator,
            classifier,
            retriever,
            event_bus,
            window,
            options,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a new session bound to `persona` for its whole lifetime.
    pub async fn create(&self, persona: Persona) -> SessionId {
        let id = SessionId::new();
        let controller = DialogueController::new(
            id.clone(),
            persona,
            self.window,
            self.generator.clone(),
            self.classifier.clone(),
            self.retriever.clone(),
            self.event_bus.clone(),
            self.options.clone(),
        );

        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(controller)));

        info!(session_id = %id, %persona, "Session created");
        id
    }

    /// Ask a question in an existing session.
    ///
    /// The per-session mutex is held across the whole turn, so concurrent
    /// asks against the same session queue up instead of interleaving
    /// history reads and appends.
    pub async fn ask(&self, id: &SessionId, question: &str) -> Result<String> {
        let controller = self.lookup(id).await?;
        let mut controller = controller.lock().await;
        controller.ask(question).await
    }

    /// The session's full turn history, oldest first.
    pub async fn history(&self, id: &SessionId) -> Result<Vec<Turn>> {
        let controller = self.lookup(id).await?;
        let controller = controller.lock().await;
        Ok(controller.turns().to_vec())
    }

    /// Close a session and drop its conversation.
    pub async fn close(&self, id: &SessionId) -> Result<()> {
        let removed = self.sessions.write().await.remove(id);
        match removed {
            Some(_) => {
                info!(session_id = %id, "Session closed");
                Ok(())
            }
            None => Err(Error::UnknownSession(id.to_string())),
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn lookup(&self, id: &SessionId) -> Result<Arc<Mutex<DialogueController>>> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UnknownSession(id.to_string()))
    }
}
