// ============================================================================
// Servorder Core - User Entity
// File: crates/servorder-core/src/domain/user.rs
// Description: Staff account with a role bound to a company and/or store
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::DomainError;

/// Role enumeration, highest privilege first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    CompanyAdmin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::CompanyAdmin => "COMPANY_ADMIN",
            Role::Manager => "MANAGER",
            Role::Employee => "EMPLOYEE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            "COMPANY_ADMIN" => Some(Role::CompanyAdmin),
            "MANAGER" => Some(Role::Manager),
            "EMPLOYEE" => Some(Role::Employee),
            _ => None,
        }
    }

    pub fn rank(&self) -> u8 {
        match self {
            Role::SuperAdmin => 4,
            Role::CompanyAdmin => 3,
            Role::Manager => 2,
            Role::Employee => 1,
        }
    }

    pub fn is_at_least(&self, other: Role) -> bool {
        self.rank() >= other.rank()
    }

    /// Whether users of this role are bound to a single store.
    pub fn is_store_bound(&self) -> bool {
        matches!(self, Role::Manager | Role::Employee)
    }

    /// Checks the company/store shape each role requires.
    pub fn check_tenancy(&self, company_id: Option<Uuid>, store_id: Option<Uuid>) -> Result<(), DomainError> {
        let ok = match self {
            Role::SuperAdmin => company_id.is_none() && store_id.is_none(),
            Role::CompanyAdmin => company_id.is_some() && store_id.is_none(),
            Role::Manager | Role::Employee => company_id.is_some() && store_id.is_some(),
        };
        if ok {
            Ok(())
        } else {
            Err(DomainError::ValidationError(format!(
                "Role {} requires {}",
                self.as_str(),
                match self {
                    Role::SuperAdmin => "no company and no store",
                    Role::CompanyAdmin => "a company and no store",
                    Role::Manager | Role::Employee => "a company and a store",
                }
            )))
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Employee
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub store_id: Option<Uuid>,

    #[validate(length(min = 2, max = 120, message = "Name must be between 2 and 120 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email"))]
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: Role,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl User {
    pub fn new(
        name: String,
        email: String,
        password_hash: String,
        role: Role,
        company_id: Option<Uuid>,
        store_id: Option<Uuid>,
        created_by: Option<Uuid>,
    ) -> Result<Self, DomainError> {
        role.check_tenancy(company_id, store_id)?;

        let user = Self {
            id: Uuid::new_v4(),
            company_id,
            store_id,
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            password_hash,
            role,
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        };

        user.validate()?;
        Ok(user)
    }

    pub fn can_login(&self) -> bool {
        self.is_active && !self.is_deleted()
    }

    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
    }

    pub fn set_password_hash(&mut self, password_hash: String, modified_by: Uuid) {
        self.password_hash = password_hash;
        self.touch(modified_by);
    }

    pub fn assign_role(
        &mut self,
        role: Role,
        company_id: Option<Uuid>,
        store_id: Option<Uuid>,
        modified_by: Uuid,
    ) -> Result<(), DomainError> {
        role.check_tenancy(company_id, store_id)?;
        self.role = role;
        self.company_id = company_id;
        self.store_id = store_id;
        self.touch(modified_by);
        Ok(())
    }

    pub fn touch(&mut self, modified_by: Uuid) {
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);
    }

    pub fn soft_delete(&mut self, deleted_by: Uuid) {
        self.removed_at = Some(Utc::now());
        self.removed_by = Some(deleted_by);
        self.is_active = false;
    }

    pub fn is_deleted(&self) -> bool {
        self.removed_at.is_some()
    }
}
