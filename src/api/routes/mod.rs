pub mod chat;
pub mod documents;
pub mod health;
pub mod insights;
pub mod sessions;

use axum::http::{header, Method};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(sessions::create_session))
        .route("/sessions/{session_id}", get(sessions::get_messages))
        .route("/sessions/{session_id}", delete(sessions::delete_session))
        .route("/sessions/{session_id}/chat", post(chat::chat_handler))
        .route(
            "/sessions/{session_id}/documents",
            post(documents::ingest_document),
        )
        .route(
            "/sessions/{session_id}/insights",
            get(insights::get_insights),
        )
}
