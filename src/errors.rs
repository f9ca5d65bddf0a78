use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("incorrect username or password")]
    InvalidCredentials,

    #[error("missing Authorization header")]
    MissingCredentials,

    #[error("invalid or expired token")]
    InvalidOrExpiredToken,

    #[error("{0}")]
    IncompleteTimeRange(String),

    #[error("at least one time range is required: start_time/end_time or created_start_time/created_end_time")]
    MissingTimeRange,

    #[error("invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials
            | AppError::MissingCredentials
            | AppError::InvalidOrExpiredToken => StatusCode::UNAUTHORIZED,
            AppError::IncompleteTimeRange(_) | AppError::MissingTimeRange => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidParameter { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "internal server error".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}
