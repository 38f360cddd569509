use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use tracing::error;

use crate::validate::FieldError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Every failure a handler can return; rendered as `{"error": ...}` JSON.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(FieldError),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    DatabaseError(noticeboard_dal::Error),
}

impl From<noticeboard_dal::Error> for ApiError {
    fn from(value: noticeboard_dal::Error) -> Self {
        match value {
            noticeboard_dal::Error::RecordNotFound(entity) => ApiError::NotFound(entity),
            noticeboard_dal::Error::AlreadyExists(entity) => ApiError::AlreadyExists(entity),
            other => ApiError::DatabaseError(other),
        }
    }
}

impl From<FieldError> for ApiError {
    fn from(value: FieldError) -> Self {
        ApiError::InvalidRequest(value)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyExists(_) => StatusCode::CONFLICT,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::InvalidRequest(field_error) => json!(field_error),
            ApiError::DatabaseError(e) => {
                error!("Database error: {e}");
                json!("Internal server error")
            }
            other => json!(other.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dal_errors_mapping() {
        let err: ApiError = noticeboard_dal::Error::RecordNotFound("Announcement".into()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Announcement not found");

        let err: ApiError = noticeboard_dal::Error::AlreadyExists("Announcement".into()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Announcement already exists");

        let err: ApiError = noticeboard_dal::Error::DatabaseError(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
