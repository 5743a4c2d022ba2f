use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub file_name: String,
    /// Extracted resume text; PDF-to-text conversion happens upstream.
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub relative_path: String,
    pub chunks: usize,
}

pub async fn ingest_document(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<IngestRequest>,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or_else(|| ApiError(crate::domain::DomainError::not_found("Unknown session")))?;

    let scope_id = session.lock().await.scope_id.clone();

    let (document, chunks) = state
        .ingest
        .ingest(&scope_id, &request.file_name, &request.content)
        .await?;

    tracing::info!(%session_id, path = document.relative_path, chunks, "resume indexed");

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            relative_path: document.relative_path,
            chunks,
        }),
    ))
}
