//! `newsdesk ask` — One-shot question against the configured services.

use newsdesk_config::AppConfig;
use newsdesk_core::Persona;

pub async fn run(question: &str, persona: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    config.validate().map_err(|e| format!("Invalid config: {e}"))?;

    let persona: Persona = persona
        .unwrap_or_else(|| config.chat.persona.clone())
        .parse()
        .map_err(|e: String| format!("Invalid persona: {e}"))?;

    let registry = super::stack::build_registry(&config)?;

    let id = registry.create(persona).await;
    let answer = registry.ask(&id, question).await?;
    registry.close(&id).await?;

    println!("{answer}");
    Ok(())
}
