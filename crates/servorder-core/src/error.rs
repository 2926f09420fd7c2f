//! Domain errors

use servorder_security::PasswordError;
use thiserror::Error;

use crate::domain::OrderStatus;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Company not found")]
    CompanyNotFound,

    #[error("Store not found")]
    StoreNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Client not found")]
    ClientNotFound,

    #[error("Service order not found")]
    ServiceOrderNotFound,

    #[error("User not active")]
    UserNotActive,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Company document already exists: {0}")]
    CompanyDocumentAlreadyExists(String),

    #[error("Invalid status transition from {} to {}", .from.as_str(), .to.as_str())]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("Service order is {} and can no longer be edited", .0.as_str())]
    OrderNotEditable(OrderStatus),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Password too short")]
    PasswordTooShort,

    #[error("Password too long")]
    PasswordTooLong,

    #[error("Password too weak")]
    PasswordTooWeak,

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::ValidationError(errors.to_string())
    }
}

impl From<PasswordError> for DomainError {
    fn from(error: PasswordError) -> Self {
        match error {
            PasswordError::TooShort => DomainError::PasswordTooShort,
            PasswordError::TooLong => DomainError::PasswordTooLong,
            PasswordError::TooWeak { .. } => DomainError::PasswordTooWeak,
            PasswordError::HashError(msg) => DomainError::PasswordHashError(msg),
        }
    }
}
