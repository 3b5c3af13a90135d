use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Tagged failure surfaced to clients as `{"error": kind, "message": ...}`.
/// Every user-visible message says what failed without requiring the logs;
/// store errors keep their cause in the log only.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Error {context}. Please try again.")]
    Store {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    /// `map_err(ApiError::store("creating circle"))`
    pub fn store(context: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::Store { context, source }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Upload(_) => "upload",
            Self::Conflict(_) => "conflict",
            Self::Store { .. } => "store",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::Upload(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Store { context, source } = &self {
            tracing::error!("store error while {}: {:#}", context, source);
        }

        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn response_status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn auth_returns_401() {
        assert_eq!(
            response_status(ApiError::Auth("Sign in required".into())),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn forbidden_returns_403() {
        assert_eq!(
            response_status(ApiError::Forbidden("Not yours".into())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn validation_and_upload_return_400() {
        assert_eq!(
            response_status(ApiError::Validation("Title is required".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            response_status(ApiError::Upload("Missing file".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn store_returns_500_with_retry_message() {
        let err = ApiError::store("creating circle")(anyhow::anyhow!("disk full"));
        assert_eq!(err.to_string(), "Error creating circle. Please try again.");
        assert_eq!(response_status(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
