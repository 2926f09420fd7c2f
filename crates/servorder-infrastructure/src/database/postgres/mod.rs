//! PostgreSQL repository implementations

pub mod company_repo_impl;
pub mod store_repo_impl;
pub mod user_repo_impl;
pub mod client_repo_impl;
pub mod service_order_repo_impl;

pub use company_repo_impl::PgCompanyRepository;
pub use store_repo_impl::PgStoreRepository;
pub use user_repo_impl::PgUserRepository;
pub use client_repo_impl::PgClientRepository;
pub use service_order_repo_impl::PgServiceOrderRepository;

use servorder_core::error::DomainError;
use tracing::error;

/// Logs a storage failure and converts it into a domain error.
pub(crate) fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|d| d.is_unique_violation())
}

/// `%term%` for ILIKE filters; blank searches are ignored.
pub(crate) fn like_pattern(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
}
