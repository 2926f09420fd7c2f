//! Store repository trait (port)

use async_trait::async_trait;
use servorder_shared::{Page, Pagination};
use uuid::Uuid;

use crate::access::TenantScope;
use crate::domain::Store;
use crate::error::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreFilter {
    pub scope: TenantScope,
    pub search: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Store>, DomainError>;
    async fn list(&self, filter: &StoreFilter, pagination: Pagination) -> Result<Page<Store>, DomainError>;
    async fn create(&self, store: &Store) -> Result<Store, DomainError>;
    /// Does not touch `next_order_number`, which only order creation advances.
    async fn update(&self, store: &Store) -> Result<Store, DomainError>;
}
