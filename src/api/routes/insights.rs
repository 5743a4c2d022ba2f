use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::application::ResumeInsights;

pub async fn get_insights(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ResumeInsights>, ApiError> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or_else(|| ApiError(crate::domain::DomainError::not_found("Unknown session")))?;

    let scope_id = session.lock().await.scope_id.clone();
    let insights = state.insights.generate(&scope_id).await?;

    Ok(Json(insights))
}
