//! User repository trait (port)

use async_trait::async_trait;
use servorder_shared::{Page, Pagination};
use uuid::Uuid;

use crate::access::TenantScope;
use crate::domain::{Role, User};
use crate::error::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub scope: TenantScope,
    pub role: Option<Role>,
    /// Case-insensitive match on name or email.
    pub search: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn list(&self, filter: &UserFilter, pagination: Pagination) -> Result<Page<User>, DomainError>;
    async fn create(&self, user: &User) -> Result<User, DomainError>;
    async fn update(&self, user: &User) -> Result<User, DomainError>;
}
