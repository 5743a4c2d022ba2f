use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::Message;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub scope_id: String,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub session_id: Uuid,
    pub messages: Vec<Message>,
}

pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionResponse>) {
    let (session_id, scope_id) = state.sessions.create();
    tracing::info!(%session_id, scope_id, "session created");

    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            scope_id,
        }),
    )
}

pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<MessagesResponse>, StatusCode> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or(StatusCode::NOT_FOUND)?;

    let messages = session.lock().await.messages.clone();
    Ok(Json(MessagesResponse {
        session_id,
        messages,
    }))
}

/// Explicit reset: the conversation and its indexed scope are destroyed
/// together.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let session = state
        .sessions
        .remove(&session_id)
        .ok_or_else(|| ApiError(crate::domain::DomainError::not_found("Unknown session")))?;

    let scope_id = {
        let mut guard = session.lock().await;
        guard.reset();
        guard.scope_id.clone()
    };

    state.ingest.remove_scope(&scope_id).await?;
    tracing::info!(%session_id, scope_id, "session reset");

    Ok(StatusCode::NO_CONTENT)
}
