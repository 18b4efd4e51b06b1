//! HTTP error payloads.
//!
//! Translates core `AppError` variants into status codes and the
//! `{message}` JSON envelope the API speaks everywhere. Internal detail is
//! logged, never sent to the caller.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use ladle_core::error::AppError;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError(AppError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            AppError::NotFound(entity, _) => format!("{entity} not found"),
            AppError::ValidationError(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Internal(_) => "Server Error".to_string(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(detail) = &self.0 {
            log::error!("request failed: {detail}");
        }
        HttpResponse::build(self.status()).json(json!({ "message": self.message() }))
    }
}

/// A specialized Result type for HTTP handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
