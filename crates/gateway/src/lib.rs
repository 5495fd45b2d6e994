//! HTTP API gateway for newsdesk.
//!
//! Exposes the session lifecycle and ask endpoints over REST:
//!
//! - `GET    /health`                    — Liveness check
//! - `POST   /v1/sessions`               — Open a session bound to a persona
//! - `POST   /v1/sessions/{id}/ask`      — Ask a question, get the answer
//! - `GET    /v1/sessions/{id}/history`  — Ordered turn history
//! - `DELETE /v1/sessions/{id}`          — Close a session
//!
//! Built on Axum. The gateway is thin plumbing: every decision lives in
//! the dialogue controller behind the session registry.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
};
use newsdesk_chat::SessionRegistry;
use newsdesk_core::{Error, Persona, SessionId, Turn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub registry: Arc<SessionRegistry>,
    /// Persona used when a create request does not name one.
    pub default_persona: Persona,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/sessions", post(create_session_handler))
        .route("/v1/sessions/{id}/ask", post(ask_handler))
        .route("/v1/sessions/{id}/history", get(history_handler))
        .route("/v1/sessions/{id}", delete(close_session_handler))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(
    host: &str,
    port: u16,
    state: SharedState,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Gateway listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct CreateSessionRequest {
    /// "technical" or "non-technical"; omit for the deployment default.
    #[serde(default)]
    persona: Option<String>,
}

#[derive(Serialize)]
struct CreateSessionResponse {
    session_id: String,
    persona: Persona,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
}

#[derive(Serialize)]
struct HistoryResponse {
    turns: Vec<TurnDto>,
}

#[derive(Serialize)]
struct TurnDto {
    role: String,
    content: String,
}

impl From<&Turn> for TurnDto {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role.label().to_lowercase(),
            content: turn.content.clone(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Map a domain error onto an HTTP status.
///
/// Generation failures are the upstream service's fault, so they surface
/// as 502 while the session stays usable for the next request.
fn error_response(err: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        Error::UnknownSession(_) => StatusCode::NOT_FOUND,
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::Generation(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: err.to_string() }))
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_session_handler(
    State(state): State<SharedState>,
    Json(request): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let persona = match request.persona {
        Some(name) => match name.parse::<Persona>() {
            Ok(p) => p,
            Err(e) => {
                return error_response(Error::Validation(e)).into_response();
            }
        },
        None => state.default_persona,
    };

    let id = state.registry.create(persona).await;
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: id.to_string(),
            persona,
        }),
    )
        .into_response()
}

async fn ask_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(request): Json<AskRequest>,
) -> impl IntoResponse {
    let id = SessionId::from(&id);
    match state.registry.ask(&id, &request.question).await {
        Ok(answer) => Json(AskResponse { answer }).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn history_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = SessionId::from(&id);
    match state.registry.history(&id).await {
        Ok(turns) => Json(HistoryResponse {
            turns: turns.iter().map(TurnDto::from).collect(),
        })
        .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

async fn close_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let id = SessionId::from(&id);
    match state.registry.close(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use newsdesk_chat::{ControllerOptions, HistoryWindow};
    use newsdesk_core::error::{ClassifierError, GenerationError};
    use newsdesk_core::event::EventBus;
    use newsdesk_core::{Generator, RetrievalNeedClassifier};

    /// Lightweight mock generator for gateway tests.
    struct MockGenerator {
        reply: Option<String>,
    }

    #[async_trait::async_trait]
    impl Generator for MockGenerator {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            match &self.reply {
                Some(reply) => Ok(reply.clone()),
                None => Err(GenerationError::Network("upstream down".into())),
            }
        }
    }

    struct NeverClassifier;

    #[async_trait::async_trait]
    impl RetrievalNeedClassifier for NeverClassifier {
        fn name(&self) -> &str {
            "never"
        }

        async fn needs_retrieval(&self, _question: &str) -> Result<bool, ClassifierError> {
            Ok(false)
        }
    }

    fn test_state(reply: Option<&str>) -> SharedState {
        let registry = SessionRegistry::new(
            Arc::new(MockGenerator { reply: reply.map(String::from) }),
            Arc::new(NeverClassifier),
            None,
            Arc::new(EventBus::default()),
            HistoryWindow::Bounded(5),
            ControllerOptions::default(),
        );
        Arc::new(GatewayState {
            registry: Arc::new(registry),
            default_persona: Persona::Technical,
        })
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(Some("ok")));

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_ask_history_close_flow() {
        let state = test_state(Some("The latest answer."));
        let app = build_router(state);

        // Create a session
        let response = app
            .clone()
            .oneshot(post_json("/v1/sessions", serde_json::json!({ "persona": "technical" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        let id = created["session_id"].as_str().unwrap().to_string();

        // Ask a question
        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/v1/sessions/{id}/ask"),
                serde_json::json!({ "question": "What is new in AI today?" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let asked = json_body(response).await;
        assert_eq!(asked["answer"], "The latest answer.");

        // History holds user + assistant turns
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/v1/sessions/{id}/history"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let history = json_body(response).await;
        let turns = history["turns"].as_array().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0]["role"], "user");
        assert_eq!(turns[1]["role"], "assistant");

        // Close the session
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let app = build_router(test_state(Some("unused")));

        let response = app
            .oneshot(post_json(
                "/v1/sessions/no-such-session/ask",
                serde_json::json!({ "question": "hello there world" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bad_persona_is_400() {
        let app = build_router(test_state(Some("unused")));

        let response = app
            .oneshot(post_json("/v1/sessions", serde_json::json!({ "persona": "pirate" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_question_is_400() {
        let app = build_router(test_state(Some("unused")));

        let response = app
            .clone()
            .oneshot(post_json("/v1/sessions", serde_json::json!({})))
            .await
            .unwrap();
        let id = json_body(response).await["session_id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(post_json(
                &format!("/v1/sessions/{id}/ask"),
                serde_json::json!({ "question": "   " }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn generation_failure_is_502_and_session_survives() {
        let app = build_router(test_state(None));

        let response = app
            .clone()
            .oneshot(post_json("/v1/sessions", serde_json::json!({})))
            .await
            .unwrap();
        let id = json_body(response).await["session_id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(post_json(
                &format!("/v1/sessions/{id}/ask"),
                serde_json::json!({ "question": "Explain how quantum computers work" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        // History is untouched and the session still answers requests.
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/v1/sessions/{id}/history"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let history = json_body(response).await;
        assert!(history["turns"].as_array().unwrap().is_empty());
    }
}
