//! HTTP API.
//!
//! Every endpoint is a `GET` driven by query parameters.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/rag/?web_path=` | Answer the configured question about a web page (plain text) |
//! | `GET`  | `/character-responses/?news_information=` | Replies from every persona |
//! | `GET`  | `/chat-completion/?rag_information=&client_message=&chat_completion_character_name=` | Reply from one persona |
//! | `GET`  | `/character-responses/moderated/?news_information=&prompt_to_answer=` | Replies from the personas the moderator picks |
//! | `GET`  | `/character-system-role/?character_name=` | A persona's system prompt |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Every failure is a `400` with a JSON body:
//!
//! ```json
//! { "error": { "code": "invalid_url", "message": "Invalid URL provided: not-a-url" } }
//! ```
//!
//! Error codes: `missing_parameter`, `invalid_url`, `<stage>_failed` (one per
//! RAG stage, e.g. `load_failed`), `unknown_persona`, `provider_error`,
//! `completion_failed`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tertulia_core::models::PersonaResponse;
use tertulia_core::validate::{parse_web_url, InvalidUrl};

use crate::config::Config;
use crate::moderator::{moderated_responses, ModeratorError};
use crate::rag::{answer_from_page, StageError};
use crate::responder::{respond, respond_all, PersonaError};
use crate::services::Services;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub services: Services,
}

/// Starts the HTTP server on `[server].bind` and serves until terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let services = Services::from_config(config)?;
    let state = AppState {
        config: Arc::new(config.clone()),
        services,
    };

    let bind_addr = config.server.bind.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    println!("Tertulia server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Routes, CORS, and request tracing over `state`.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/rag/", get(handle_rag))
        .route("/character-responses/", get(handle_character_responses))
        .route("/chat-completion/", get(handle_chat_completion))
        .route(
            "/character-responses/moderated/",
            get(handle_moderated_responses),
        )
        .route("/character-system-role/", get(handle_system_role))
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Error that converts into a `400` JSON response.
#[derive(Debug)]
struct AppError {
    code: String,
    message: String,
}

impl AppError {
    fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::warn!(code = %self.code, message = %self.message, "request failed");
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl From<InvalidUrl> for AppError {
    fn from(err: InvalidUrl) -> Self {
        AppError::new("invalid_url", err.to_string())
    }
}

impl From<StageError> for AppError {
    fn from(err: StageError) -> Self {
        AppError::new(format!("{}_failed", err.stage.label()), err.to_string())
    }
}

impl From<PersonaError> for AppError {
    fn from(err: PersonaError) -> Self {
        let code = match &err {
            PersonaError::UnknownPersona(_) => "unknown_persona",
            PersonaError::Provider { .. } => "provider_error",
            PersonaError::Unexpected { .. } => "completion_failed",
        };
        AppError::new(code, err.to_string())
    }
}

impl From<ModeratorError> for AppError {
    fn from(err: ModeratorError) -> Self {
        let message = err.to_string();
        match err {
            ModeratorError::ClassificationProvider(_) => AppError::new("provider_error", message),
            ModeratorError::Classification(_) => AppError::new("completion_failed", message),
            ModeratorError::Persona(inner) => inner.into(),
        }
    }
}

/// Returns the parameter value, rejecting absent or blank values.
fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::new(
            "missing_parameter",
            format!("Missing required parameter: {}", name),
        )),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /rag/ ============

#[derive(Deserialize)]
struct RagParams {
    web_path: Option<String>,
}

/// Validates `web_path` before any stage runs, then answers in plain text.
async fn handle_rag(
    State(state): State<AppState>,
    Query(params): Query<RagParams>,
) -> Result<String, AppError> {
    let web_path = required(params.web_path, "web_path")?;
    let url = parse_web_url(&web_path)?;
    tracing::info!(%url, "rag request");

    let answer = answer_from_page(&state.config, &state.services, &url).await?;
    Ok(answer)
}

// ============ GET /character-responses/ ============

#[derive(Deserialize)]
struct CharacterResponsesParams {
    news_information: Option<String>,
}

async fn handle_character_responses(
    State(state): State<AppState>,
    Query(params): Query<CharacterResponsesParams>,
) -> Result<Json<Vec<PersonaResponse>>, AppError> {
    let news = required(params.news_information, "news_information")?;
    tracing::info!(chars = news.chars().count(), "character responses request");

    let ids = state.services.personas.ids();
    let responses = respond_all(
        &state.services,
        &ids,
        &news,
        None,
        state.config.moderator.parallel,
    )
    .await?;
    Ok(Json(responses))
}

// ============ GET /chat-completion/ ============

#[derive(Deserialize)]
struct ChatCompletionParams {
    rag_information: Option<String>,
    client_message: Option<String>,
    chat_completion_character_name: Option<String>,
}

async fn handle_chat_completion(
    State(state): State<AppState>,
    Query(params): Query<ChatCompletionParams>,
) -> Result<Json<PersonaResponse>, AppError> {
    let context_text = required(params.rag_information, "rag_information")?;
    let message = required(params.client_message, "client_message")?;
    let name = required(
        params.chat_completion_character_name,
        "chat_completion_character_name",
    )?;
    tracing::info!(persona = %name, "chat completion request");

    let reply = respond(&state.services, &name, &context_text, Some(&message)).await?;
    Ok(Json(PersonaResponse {
        name,
        message: reply,
    }))
}

// ============ GET /character-responses/moderated/ ============

#[derive(Deserialize)]
struct ModeratedParams {
    news_information: Option<String>,
    prompt_to_answer: Option<String>,
}

async fn handle_moderated_responses(
    State(state): State<AppState>,
    Query(params): Query<ModeratedParams>,
) -> Result<Json<Vec<PersonaResponse>>, AppError> {
    let news = required(params.news_information, "news_information")?;
    let prompt = required(params.prompt_to_answer, "prompt_to_answer")?;
    tracing::info!("moderated responses request");

    let responses =
        moderated_responses(&state.services, &state.config.moderator, &news, &prompt).await?;
    Ok(Json(responses))
}

// ============ GET /character-system-role/ ============

#[derive(Deserialize)]
struct SystemRoleParams {
    character_name: Option<String>,
}

async fn handle_system_role(
    State(state): State<AppState>,
    Query(params): Query<SystemRoleParams>,
) -> Result<Json<&'static str>, AppError> {
    let name = required(params.character_name, "character_name")?;
    let persona = state
        .services
        .personas
        .lookup(&name)
        .map_err(PersonaError::from)?;
    Ok(Json(persona.system_prompt))
}
