//! Wires the configured services into a session registry.
//!
//! Shared by `serve` and `ask`. All configuration problems surface here,
//! before any session is opened.

use newsdesk_chat::{ControllerOptions, EvidenceFormat, HistoryWindow, SessionRegistry};
use newsdesk_config::AppConfig;
use newsdesk_core::event::EventBus;
use newsdesk_core::{Generator, Retriever, RetrievalNeedClassifier};
use newsdesk_intent::{KeywordClassifier, LlmClassifier};
use newsdesk_providers::{HttpEmbedder, OpenAiCompatGenerator};
use newsdesk_retrieval::ElasticRetriever;
use std::sync::Arc;
use std::time::Duration;

/// Build the session registry from configuration.
pub fn build_registry(config: &AppConfig) -> Result<Arc<SessionRegistry>, Box<dyn std::error::Error>> {
    let Some(api_key) = config.provider.api_key.clone() else {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    NEWSDESK_API_KEY = 'sk-...'");
        eprintln!("    OPENAI_API_KEY   = 'sk-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    };

    let generator: Arc<dyn Generator> = Arc::new(
        OpenAiCompatGenerator::new(
            "openai",
            &config.provider.base_url,
            &api_key,
            &config.provider.model,
            Duration::from_secs(config.timeouts.generation_secs),
        )
        .with_temperature(config.provider.temperature)
        .with_max_tokens(config.provider.max_tokens),
    );

    let retriever: Option<Arc<dyn Retriever>> = if config.search.enabled {
        let embedder = Arc::new(HttpEmbedder::new(
            &config.embedding.base_url,
            config.embedding.api_key.as_deref().unwrap_or(&api_key),
            &config.embedding.model,
            Duration::from_secs(config.timeouts.embedding_secs),
        ));

        let mut retriever = ElasticRetriever::new(
            &config.search.url,
            &config.search.index,
            embedder,
            Duration::from_secs(config.timeouts.retrieval_secs),
        );
        if let (Some(user), Some(pass)) = (&config.search.username, &config.search.password) {
            retriever = retriever.with_basic_auth(user, pass);
        }
        Some(Arc::new(retriever))
    } else {
        None
    };

    let classifier: Arc<dyn RetrievalNeedClassifier> = match config.chat.classifier.as_str() {
        "llm" => Arc::new(LlmClassifier::new(generator.clone())),
        _ => Arc::new(KeywordClassifier::new()),
    };

    let window = if config.chat.window_turns == 0 {
        HistoryWindow::Unbounded
    } else {
        HistoryWindow::Bounded(config.chat.window_turns)
    };

    let options = ControllerOptions {
        top_k: config.search.top_k,
        reformulate_queries: config.chat.reformulate_queries,
        short_input_max_tokens: 2,
        evidence_format: EvidenceFormat {
            max_doc_chars: config.chat.max_evidence_chars,
            max_total_chars: config.chat.max_context_chars,
        },
    };

    Ok(Arc::new(SessionRegistry::new(
        generator,
        classifier,
        retriever,
        Arc::new(EventBus::default()),
        window,
        options,
    )))
}
