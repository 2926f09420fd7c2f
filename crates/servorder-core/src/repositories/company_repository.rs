//! Company repository trait (port)

use async_trait::async_trait;
use servorder_shared::{Page, Pagination};
use uuid::Uuid;

use crate::domain::Company;
use crate::error::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyFilter {
    /// Only this company (set for non super-admin callers).
    pub company_id: Option<Uuid>,
    /// Case-insensitive match on name or document.
    pub search: Option<String>,
}

/// Lookups skip soft-deleted rows. Deletion is an `update` carrying `removed_at`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Company>, DomainError>;
    async fn find_by_document(&self, document: &str) -> Result<Option<Company>, DomainError>;
    async fn list(&self, filter: &CompanyFilter, pagination: Pagination) -> Result<Page<Company>, DomainError>;
    async fn create(&self, company: &Company) -> Result<Company, DomainError>;
    async fn update(&self, company: &Company) -> Result<Company, DomainError>;
}
