use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Maps domain failures onto HTTP statuses: usage errors are the client's,
/// upstream failures are gateway errors, everything else is internal.
pub struct ApiError(pub DomainError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::NoScope | DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::UpstreamGeneration(_) | DomainError::UpstreamSearch(_) => {
                StatusCode::BAD_GATEWAY
            }
            DomainError::Canceled => StatusCode::BAD_REQUEST,
            DomainError::ExternalService(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request rejected");
        }

        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(
            ApiError(DomainError::not_found("Unknown session")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError(DomainError::NoScope).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(DomainError::upstream_generation("x")).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError(DomainError::upstream_search("x")).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError(DomainError::internal("x")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
