// ============================================================================
// Servorder Core - Access Rules
// File: crates/servorder-core/src/access.rs
// Description: Role checks and tenant scoping for the authenticated caller
// ============================================================================
//! Every service operation receives an [`Actor`]. Reads outside the actor's
//! tenant are reported as not found; role failures inside the tenant are
//! reported as forbidden.

use uuid::Uuid;

use crate::domain::{Role, User};
use crate::error::DomainError;

/// Tenant restriction applied to list queries. `None` means unrestricted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TenantScope {
    pub company_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
}

impl TenantScope {
    pub fn contains(&self, company_id: Uuid, store_id: Option<Uuid>) -> bool {
        if self.company_id.is_some_and(|c| c != company_id) {
            return false;
        }
        match self.store_id {
            Some(scope_store) => store_id == Some(scope_store),
            None => true,
        }
    }
}

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    pub company_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
}

impl Actor {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
            company_id: user.company_id,
            store_id: user.store_id,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    pub fn require_role(&self, min: Role) -> Result<(), DomainError> {
        if self.role.is_at_least(min) {
            Ok(())
        } else {
            Err(DomainError::Forbidden(format!(
                "{} role or higher required",
                min.as_str()
            )))
        }
    }

    /// SUPER_ADMIN may assign any role; everyone else only roles below their own.
    pub fn can_assign(&self, role: Role) -> bool {
        self.is_super_admin() || self.role.rank() > role.rank()
    }

    pub fn scope(&self) -> TenantScope {
        match self.role {
            Role::SuperAdmin => TenantScope::default(),
            Role::CompanyAdmin => TenantScope {
                company_id: self.company_id,
                store_id: None,
            },
            Role::Manager | Role::Employee => TenantScope {
                company_id: self.company_id,
                store_id: self.store_id,
            },
        }
    }

    pub fn can_access_company(&self, company_id: Uuid) -> bool {
        self.is_super_admin() || self.company_id == Some(company_id)
    }

    pub fn can_access_store(&self, company_id: Uuid, store_id: Uuid) -> bool {
        self.scope().contains(company_id, Some(store_id))
    }

    /// Intersects requested list filters with the actor's scope.
    ///
    /// Asking for a company or store the actor cannot see is forbidden rather
    /// than silently widened or emptied.
    pub fn narrow(&self, company_id: Option<Uuid>, store_id: Option<Uuid>) -> Result<TenantScope, DomainError> {
        let scope = self.scope();
        let company_id = merge(scope.company_id, company_id, "company")?;
        let store_id = merge(scope.store_id, store_id, "store")?;
        Ok(TenantScope { company_id, store_id })
    }

    /// Picks the store an operation acts on. Store-bound actors always act on
    /// their own store; others must name one.
    pub fn target_store(&self, requested: Option<Uuid>) -> Result<Uuid, DomainError> {
        match (self.store_id, requested) {
            (Some(own), Some(requested)) if own != requested => Err(DomainError::Forbidden(
                "Cannot act on a store other than your own".to_string(),
            )),
            (Some(own), _) => Ok(own),
            (None, Some(requested)) => Ok(requested),
            (None, None) => Err(DomainError::ValidationError("store_id is required".to_string())),
        }
    }
}

fn merge(scoped: Option<Uuid>, requested: Option<Uuid>, what: &str) -> Result<Option<Uuid>, DomainError> {
    match (scoped, requested) {
        (Some(s), Some(r)) if s != r => Err(DomainError::Forbidden(format!(
            "Requested {} is outside your scope",
            what
        ))),
        (Some(s), _) => Ok(Some(s)),
        (None, r) => Ok(r),
    }
}
