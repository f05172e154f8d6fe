//! Route handler functions for all API endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use weatherbot_chat::{HistoryAction, SessionSummary};
use weatherbot_core::TranscriptEntry;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
}

/// Request body for POST /chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Omit to start a new session.
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseBody {
    pub session_id: Uuid,
    pub response: String,
    pub action: HistoryAction,
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub session_id: Uuid,
    pub entries: Vec<TranscriptEntry>,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_sessions: state.registry.session_count(),
    })
}

/// POST /chat - run one turn, creating a session when needed.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let outcome = state.registry.submit(req.session_id, &req.message).await?;
    Ok(Json(ChatResponseBody {
        session_id: outcome.session_id,
        response: outcome.response,
        action: outcome.action,
    }))
}

/// GET /chat/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<SessionsResponse>, ApiError> {
    let sessions = state.registry.list_sessions().await?;
    Ok(Json(SessionsResponse { sessions }))
}

/// GET /chat/sessions/{id}/transcript
pub async fn session_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TranscriptResponse>, ApiError> {
    let entries = state.registry.transcript(id).await?;
    Ok(Json(TranscriptResponse {
        session_id: id,
        entries,
    }))
}

/// DELETE /chat/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.registry.delete_session(id)?;
    Ok(StatusCode::NO_CONTENT)
}
