use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug)]
pub enum AppError {
    Unauthenticated,
    Forbidden(&'static str),
    NotFound(&'static str),
    UnsupportedMediaType,
    PayloadTooLarge(u64),
    Conflict(String),
    Validation(String),
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    code: i32,
    error_message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // One message for every authentication failure so callers can't
            // probe which check rejected them.
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Not authenticated.".to_string())
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_string()),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found.", what)),
            AppError::UnsupportedMediaType => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "The file must be an image.".to_string(),
            ),
            AppError::PayloadTooLarge(max_bytes) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                format!(
                    "Image file size exceeds the limit of {} MB.",
                    max_bytes as f64 / (1024.0 * 1024.0)
                ),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error.".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            code: status.as_u16() as i32,
            error_message,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", err);
        AppError::Internal
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        tracing::error!("Password hashing error: {}", err);
        AppError::Internal
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O error: {}", err);
        AppError::Internal
    }
}
