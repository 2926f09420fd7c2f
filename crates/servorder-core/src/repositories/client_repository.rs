//! Client repository trait (port)

use async_trait::async_trait;
use servorder_shared::{Page, Pagination};
use uuid::Uuid;

use crate::access::TenantScope;
use crate::domain::Client;
use crate::error::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientFilter {
    pub scope: TenantScope,
    /// Case-insensitive match on name, or substring match on phone digits.
    pub search: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Client>, DomainError>;
    async fn list(&self, filter: &ClientFilter, pagination: Pagination) -> Result<Page<Client>, DomainError>;
    async fn create(&self, client: &Client) -> Result<Client, DomainError>;
    async fn update(&self, client: &Client) -> Result<Client, DomainError>;
}
