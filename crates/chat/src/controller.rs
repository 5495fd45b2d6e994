//! The dialogue controller state machine.
//!
//! One `ask` call is one full traversal: short-input check → classify →
//! retrieve → compose → generate → append. There is no persistent state
//! between traversals beyond the conversation itself.

use newsdesk_core::event::{EventBus, TurnEvent};
use newsdesk_core::{
    Error, Generator, Persona, Result, Retriever, RetrievalNeedClassifier, SessionId, Turn,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::history::{ConversationHistory, HistoryWindow};
use crate::prompt::{EvidenceFormat, PromptEngine, PromptInputs, PromptPath};

/// Per-controller tunables.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// How many documents to request per retrieval.
    pub top_k: usize,

    /// Reformulate retrieval queries from windowed user turns plus the
    /// question, instead of the raw question. Off by default; raw-question
    /// retrieval is the verified baseline.
    pub reformulate_queries: bool,

    /// Questions with at most this many whitespace tokens bypass
    /// classification and retrieval entirely.
    pub short_input_max_tokens: usize,

    /// Evidence truncation caps.
    pub evidence_format: EvidenceFormat,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            reformulate_queries: false,
            short_input_max_tokens: 2,
            evidence_format: EvidenceFormat::default(),
        }
    }
}

/// Drives one conversation through the ask state machine.
///
/// The controller owns its conversation exclusively. Callers must
/// serialise `ask` invocations per controller (the session registry wraps
/// each controller in a mutex); independent controllers are fully
/// concurrent.
pub struct DialogueController {
    session_id: SessionId,
    prompts: PromptEngine,
    history: ConversationHistory,
    generator: Arc<dyn Generator>,
    classifier: Arc<dyn RetrievalNeedClassifier>,
    retriever: Option<Arc<dyn Retriever>>,
    event_bus: Arc<EventBus>,
    options: ControllerOptions,
}

impl DialogueController {
    pub fn new(
        session_id: SessionId,
        persona: Persona,
        window: HistoryWindow,
        generator: Arc<dyn Generator>,
        classifier: Arc<dyn RetrievalNeedClassifier>,
        retriever: Option<Arc<dyn Retriever>>,
        event_bus: Arc<EventBus>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            session_id,
            prompts: PromptEngine::new(persona),
            history: ConversationHistory::new(window),
            generator,
            classifier,
            retriever,
            event_bus,
            options,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn persona(&self) -> Persona {
        self.prompts.persona()
    }

    /// The full turn history, oldest first.
    pub fn turns(&self) -> &[Turn] {
        self.history.turns()
    }

    /// Ask a question and return the generated answer.
    ///
    /// On success the conversation grows by exactly two turns (user, then
    /// assistant). On generation failure the error propagates and the
    /// conversation is left untouched, so the session stays usable.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::Validation("question must not be empty".into()));
        }

        self.publish(TurnEvent::QuestionReceived {
            session_id: self.session_id.to_string(),
            question_preview: preview(question),
            timestamp: Utc::now(),
        });

        // History must be read before this turn is appended.
        let conversation_text = self.history.rendered_window();

        let (path, evidence_text) = self.select_path(question).await;

        let inputs = PromptInputs {
            conversation: Some(&conversation_text),
            context: evidence_text.as_deref(),
            question: Some(question),
        };
        let prompt = self.prompts.compose(path, &inputs)?;

        self.publish(TurnEvent::PromptComposed {
            session_id: self.session_id.to_string(),
            path: path.as_answered(),
            prompt_chars: prompt.len(),
            timestamp: Utc::now(),
        });

        debug!(path = ?path, prompt_chars = prompt.len(), "Prompt composed");

        let answer = match self.generator.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Generation failed; conversation unchanged");
                self.publish(TurnEvent::TurnFailed {
                    session_id: self.session_id.to_string(),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                return Err(e.into());
            }
        };

        self.history.append(Turn::user(question));
        self.history.append(Turn::assistant(answer.clone()));

        self.publish(TurnEvent::TurnCompleted {
            session_id: self.session_id.to_string(),
            path: path.as_answered(),
            answer_chars: answer.len(),
            timestamp: Utc::now(),
        });

        info!(path = ?path, turns = self.history.len(), "Turn completed");
        Ok(answer)
    }

    /// Decide which prompt path this question takes, running the
    /// classifier and retrieval as needed. Returns the path plus the
    /// rendered evidence block for the retrieval path.
    async fn select_path(&self, question: &str) -> (PromptPath, Option<String>) {
        if question.split_whitespace().count() <= self.options.short_input_max_tokens {
            debug!("Short input; skipping classification and retrieval");
            return (PromptPath::ShortInput, None);
        }

        let needs_retrieval = match self.classifier.needs_retrieval(question).await {
            Ok(decision) => decision,
            Err(e) => {
                // Fail-safe: the general path is always available.
                warn!(error = %e, "Classifier failed; defaulting to no retrieval");
                false
            }
        };

        self.publish(TurnEvent::RetrievalDecision {
            session_id: self.session_id.to_string(),
            needs_retrieval,
            classifier: self.classifier.name().to_string(),
            timestamp: Utc::now(),
        });

        let Some(retriever) = self.retriever.as_ref().filter(|_| needs_retrieval) else {
            return (PromptPath::General, None);
        };

        let query = self.retrieval_query(question);
        self.publish(TurnEvent::RetrievalStarted {
            session_id: self.session_id.to_string(),
            query: query.clone(),
            timestamp: Utc::now(),
        });

        match retriever.search(&query, self.options.top_k).await {
            Ok(documents) if !documents.is_empty() => {
                self.publish(TurnEvent::RetrievalFinished {
                    session_id: self.session_id.to_string(),
                    documents: documents.len(),
                    degraded: false,
                    timestamp: Utc::now(),
                });
                let rendered = self.options.evidence_format.render(&documents);
                (PromptPath::Retrieval, Some(rendered))
            }
            Ok(_) => {
                self.publish(TurnEvent::RetrievalFinished {
                    session_id: self.session_id.to_string(),
                    documents: 0,
                    degraded: false,
                    timestamp: Utc::now(),
                });
                (PromptPath::NoEvidence, None)
            }
            Err(e) => {
                warn!(error = %e, "Retrieval failed; degrading to no-evidence path");
                self.publish(TurnEvent::RetrievalFinished {
                    session_id: self.session_id.to_string(),
                    documents: 0,
                    degraded: true,
                    timestamp: Utc::now(),
                });
                (PromptPath::NoEvidence, None)
            }
        }
    }

    /// The text sent to the retriever: the raw question, or (when the
    /// reformulation tunable is on) the windowed user turns joined with
    /// it, so follow-ups like "what about it?" carry their referent.
    fn retrieval_query(&self, question: &str) -> String {
        if !self.options.reformulate_queries {
            return question.to_string();
        }

        let mut parts = self.history.windowed_user_contents();
        parts.push(question);
        parts.join("\n")
    }

    fn publish(&self, event: TurnEvent) {
        self.event_bus.publish(event);
    }
}

/// First line of a question, capped for event payloads.
fn preview(question: &str) -> String {
    let line = question.lines().next().unwrap_or_default();
    line.chars().take(80).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use newsdesk_core::Role;

    fn controller(
        generator: Arc<ScriptedGenerator>,
        classifier: Arc<CountingClassifier>,
        retriever: Option<Arc<StaticRetriever>>,
    ) -> DialogueController {
        DialogueController::new(
            SessionId::new(),
            Persona::Technical,
            HistoryWindow::Bounded(5),
            generator,
            classifier,
            retriever.map(|r| r as Arc<dyn Retriever>),
            Arc::new(EventBus::default()),
            ControllerOptions::default(),
        )
    }

    #[tokio::test]
    async fn successful_ask_appends_user_then_assistant() {
        let generator = Arc::new(ScriptedGenerator::single("Here you go."));
        let classifier = Arc::new(CountingClassifier::always(false));
        let mut ctrl = controller(generator, classifier, None);

        let answer = ctrl.ask("Explain how neural networks work").await.unwrap();
        assert_eq!(answer, "Here you go.");

        let turns = ctrl.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "Explain how neural networks work");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "Here you go.");
    }

    #[tokio::test]
    async fn failed_generation_leaves_history_unchanged() {
        let classifier = Arc::new(CountingClassifier::always(false));
        let mut ctrl = DialogueController::new(
            SessionId::new(),
            Persona::Technical,
            HistoryWindow::Bounded(5),
            Arc::new(FailingGenerator),
            classifier,
            None,
            Arc::new(EventBus::default()),
            ControllerOptions::default(),
        );

        let err = ctrl.ask("Explain how neural networks work").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
        assert!(ctrl.turns().is_empty());
    }

    #[tokio::test]
    async fn short_input_bypasses_classifier() {
        let generator = Arc::new(ScriptedGenerator::new(vec!["Hello!", "Sure thing."]));
        let classifier = Arc::new(CountingClassifier::always(true));
        let retriever = Arc::new(StaticRetriever::returning(sample_documents()));
        let mut ctrl = controller(generator.clone(), classifier.clone(), Some(retriever.clone()));

        ctrl.ask("hi").await.unwrap();
        ctrl.ask("ok sure").await.unwrap();

        assert_eq!(classifier.call_count(), 0);
        assert!(retriever.queries.lock().unwrap().is_empty());
        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("very short message"));
    }

    #[tokio::test]
    async fn three_token_question_reaches_classifier() {
        let generator = Arc::new(ScriptedGenerator::single("An answer."));
        let classifier = Arc::new(CountingClassifier::always(false));
        let mut ctrl = controller(generator, classifier.clone(), None);

        ctrl.ask("what is rust").await.unwrap();
        assert_eq!(classifier.call_count(), 1);
    }

    #[tokio::test]
    async fn retrieval_path_includes_source_urls_in_prompt() {
        let generator = Arc::new(ScriptedGenerator::single("Grounded answer."));
        let classifier = Arc::new(CountingClassifier::always(true));
        let retriever = Arc::new(StaticRetriever::returning(sample_documents()));
        let mut ctrl = controller(generator.clone(), classifier, Some(retriever));

        ctrl.ask("What's the latest news in AI?").await.unwrap();

        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("Use the following articles"));
        assert!(prompt.contains("https://example.com/reasoning-model"));
    }

    #[tokio::test]
    async fn empty_retrieval_selects_no_evidence_template() {
        let generator = Arc::new(ScriptedGenerator::single("Fallback answer."));
        let classifier = Arc::new(CountingClassifier::always(true));
        let retriever = Arc::new(StaticRetriever::empty());
        let mut ctrl = controller(generator.clone(), classifier, Some(retriever));

        ctrl.ask("Any news about underwater datacenters?").await.unwrap();

        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("no relevant information was found"));
        assert!(!prompt.contains("Use the following articles"));
    }

    #[tokio::test]
    async fn retriever_failure_degrades_to_no_evidence() {
        let generator = Arc::new(ScriptedGenerator::single("Degraded answer."));
        let classifier = Arc::new(CountingClassifier::always(true));
        let retriever = Arc::new(StaticRetriever::failing());
        let mut ctrl = controller(generator.clone(), classifier, Some(retriever));

        let answer = ctrl.ask("What's new in quantum computing?").await.unwrap();
        assert_eq!(answer, "Degraded answer.");

        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("no relevant information was found"));
        assert_eq!(ctrl.turns().len(), 2);
    }

    #[tokio::test]
    async fn classifier_failure_defaults_to_general_path() {
        let generator = Arc::new(ScriptedGenerator::single("General answer."));
        let classifier = Arc::new(CountingClassifier::failing());
        let retriever = Arc::new(StaticRetriever::returning(sample_documents()));
        let mut ctrl = controller(generator.clone(), classifier, Some(retriever.clone()));

        ctrl.ask("What's the latest in AI?").await.unwrap();

        assert!(retriever.queries.lock().unwrap().is_empty());
        let prompt = generator.last_prompt().unwrap();
        assert!(!prompt.contains("Use the following articles"));
        assert!(!prompt.contains("no relevant information was found"));
    }

    #[tokio::test]
    async fn no_retriever_means_general_path_even_when_needed() {
        let generator = Arc::new(ScriptedGenerator::single("From general knowledge."));
        let classifier = Arc::new(CountingClassifier::always(true));
        let mut ctrl = controller(generator.clone(), classifier, None);

        ctrl.ask("What's the latest in AI?").await.unwrap();
        let prompt = generator.last_prompt().unwrap();
        assert!(!prompt.contains("Use the following articles"));
    }

    #[tokio::test]
    async fn empty_question_is_a_validation_error() {
        let generator = Arc::new(ScriptedGenerator::single("unused"));
        let classifier = Arc::new(CountingClassifier::always(false));
        let mut ctrl = controller(generator.clone(), classifier, None);

        let err = ctrl.ask("   ").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(generator.call_count(), 0);
        assert!(ctrl.turns().is_empty());
    }

    #[tokio::test]
    async fn raw_question_is_default_retrieval_query() {
        let generator = Arc::new(ScriptedGenerator::new(vec!["a", "b"]));
        let classifier = Arc::new(CountingClassifier::always(true));
        let retriever = Arc::new(StaticRetriever::returning(sample_documents()));
        let mut ctrl = controller(generator, classifier, Some(retriever.clone()));

        ctrl.ask("Tell me about the new GPU release").await.unwrap();
        assert_eq!(
            retriever.last_query().unwrap(),
            "Tell me about the new GPU release"
        );
    }

    #[tokio::test]
    async fn reformulation_joins_windowed_user_turns() {
        let generator = Arc::new(ScriptedGenerator::new(vec!["a", "b"]));
        let classifier = Arc::new(CountingClassifier::always(true));
        let retriever = Arc::new(StaticRetriever::returning(sample_documents()));

        let options = ControllerOptions {
            reformulate_queries: true,
            ..ControllerOptions::default()
        };

        let mut ctrl = DialogueController::new(
            SessionId::new(),
            Persona::Technical,
            HistoryWindow::Bounded(5),
            generator,
            classifier,
            Some(retriever.clone() as Arc<dyn Retriever>),
            Arc::new(EventBus::default()),
            options,
        );

        ctrl.ask("Tell me about the new GPU release").await.unwrap();
        ctrl.ask("What does it mean for gamers?").await.unwrap();

        let query = retriever.last_query().unwrap();
        assert!(query.contains("Tell me about the new GPU release"));
        assert!(query.contains("What does it mean for gamers?"));
    }

    #[tokio::test]
    async fn second_turn_prompt_contains_first_turn_history() {
        let generator = Arc::new(ScriptedGenerator::new(vec!["First answer.", "Second answer."]));
        let classifier = Arc::new(CountingClassifier::always(false));
        let mut ctrl = controller(generator.clone(), classifier, None);

        ctrl.ask("What is an embedding model?").await.unwrap();
        ctrl.ask("How large are they typically?").await.unwrap();

        let prompt = generator.last_prompt().unwrap();
        assert!(prompt.contains("User: What is an embedding model?"));
        assert!(prompt.contains("Assistant: First answer."));
    }

    #[tokio::test]
    async fn events_trace_the_retrieval_path() {
        let bus = Arc::new(EventBus::new(64));
        let mut rx = bus.subscribe();

        let generator = Arc::new(ScriptedGenerator::single("Answer."));
        let classifier = Arc::new(CountingClassifier::always(true));
        let retriever = Arc::new(StaticRetriever::returning(sample_documents()));

        let mut ctrl = DialogueController::new(
            SessionId::new(),
            Persona::Technical,
            HistoryWindow::Bounded(5),
            generator,
            classifier,
            Some(retriever as Arc<dyn Retriever>),
            bus.clone(),
            ControllerOptions::default(),
        );

        ctrl.ask("What's the latest news in AI?").await.unwrap();

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(match event.as_ref() {
                TurnEvent::QuestionReceived { .. } => "question",
                TurnEvent::RetrievalDecision { .. } => "decision",
                TurnEvent::RetrievalStarted { .. } => "started",
                TurnEvent::RetrievalFinished { .. } => "finished",
                TurnEvent::PromptComposed { .. } => "composed",
                TurnEvent::TurnCompleted { .. } => "completed",
                TurnEvent::TurnFailed { .. } => "failed",
            });
        }

        assert_eq!(
            kinds,
            vec!["question", "decision", "started", "finished", "composed", "completed"]
        );
    }
}
