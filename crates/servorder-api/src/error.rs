// ============================================================================
// Servorder API - Error Responses
// File: crates/servorder-api/src/error.rs
// ============================================================================

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use servorder_core::error::DomainError;

use crate::response::{ApiResponse, ErrorBody};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("Too many login attempts, try again later")]
    RateLimited,

    #[error("Request timed out")]
    Timeout,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InvalidState(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InvalidState(_) => "INVALID_STATE",
            ApiError::RateLimited => "RATE_LIMITED",
            ApiError::Timeout => "TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn log(&self) {
        match self {
            ApiError::Validation(msg) => tracing::debug!("Validation error: {}", msg),
            ApiError::Unauthorized(msg) => tracing::warn!("Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => tracing::warn!("Forbidden: {}", msg),
            ApiError::RateLimited => tracing::warn!("Login rate limit hit"),
            ApiError::Timeout => tracing::warn!("Request timed out"),
            ApiError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            ApiError::NotFound(_)
            | ApiError::MethodNotAllowed(_)
            | ApiError::Conflict(_)
            | ApiError::InvalidState(_) => {}
        }
    }
}

impl From<&ApiError> for ErrorBody {
    /// Internal details stay in the logs.
    fn from(error: &ApiError) -> Self {
        let message = match error {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };
        ErrorBody {
            code: error.code().to_string(),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        let body = ApiResponse::<()>::failure(ErrorBody::from(&self));
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        let message = error.to_string();
        match error {
            DomainError::CompanyNotFound
            | DomainError::StoreNotFound
            | DomainError::UserNotFound
            | DomainError::ClientNotFound
            | DomainError::ServiceOrderNotFound => ApiError::NotFound(message),

            DomainError::InvalidCredentials | DomainError::UserNotActive | DomainError::InvalidToken(_) => {
                ApiError::Unauthorized(message)
            }

            DomainError::Forbidden(_) => ApiError::Forbidden(message),

            DomainError::EmailAlreadyExists(_) | DomainError::CompanyDocumentAlreadyExists(_) => {
                ApiError::Conflict(message)
            }

            DomainError::InvalidStatusTransition { .. } | DomainError::OrderNotEditable(_) => {
                ApiError::InvalidState(message)
            }

            DomainError::InvalidPhone(_)
            | DomainError::PasswordTooShort
            | DomainError::PasswordTooLong
            | DomainError::PasswordTooWeak
            | DomainError::ValidationError(_) => ApiError::Validation(message),

            DomainError::PasswordHashError(_)
            | DomainError::TokenGenerationError(_)
            | DomainError::DatabaseError(_)
            | DomainError::InternalError(_) => ApiError::Internal(message),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servorder_core::domain::OrderStatus;

    fn status_of(error: DomainError) -> StatusCode {
        ApiError::from(error).into_response().status()
    }

    #[test]
    fn test_domain_errors_map_to_status_codes() {
        assert_eq!(status_of(DomainError::ClientNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(DomainError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(DomainError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(DomainError::EmailAlreadyExists("a@b.c".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(DomainError::OrderNotEditable(OrderStatus::Paid)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(DomainError::PasswordTooWeak), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(DomainError::DatabaseError("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_carries_code_and_hides_internal_details() {
        let body = ErrorBody::from(&ApiError::Internal("connection refused".to_string()));
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert_eq!(body.message, "Internal server error");

        let body = ErrorBody::from(&ApiError::from(DomainError::OrderNotEditable(OrderStatus::Paid)));
        assert_eq!(body.code, "INVALID_STATE");
        assert!(body.message.contains("PAID"));
    }

    #[test]
    fn test_timeout_maps_to_request_timeout() {
        assert_eq!(ApiError::Timeout.status_code(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(ApiError::Timeout.code(), "TIMEOUT");
    }
}
