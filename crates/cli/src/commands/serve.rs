//! `newsdesk serve` — Start the HTTP gateway.

use newsdesk_config::AppConfig;
use newsdesk_core::Persona;
use newsdesk_gateway::GatewayState;
use std::sync::Arc;
use tracing::info;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    config.validate().map_err(|e| format!("Invalid config: {e}"))?;

    let registry = super::stack::build_registry(&config)?;

    let default_persona: Persona = config
        .chat
        .persona
        .parse()
        .map_err(|e: String| format!("Invalid config: {e}"))?;

    let port = port_override.unwrap_or(config.gateway.port);
    info!(
        classifier = %config.chat.classifier,
        search_enabled = config.search.enabled,
        "Starting gateway"
    );

    let state = Arc::new(GatewayState {
        registry,
        default_persona,
    });

    newsdesk_gateway::start(&config.gateway.host, port, state).await
}
