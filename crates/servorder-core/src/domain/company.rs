// ============================================================================
// Servorder Core - Company Entity
// File: crates/servorder-core/src/domain/company.rs
// Description: Top-level tenant that operates stores
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Company entity (tenant root)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Company {
    pub id: Uuid,

    #[validate(length(min = 2, max = 120, message = "Company name must be between 2 and 120 characters"))]
    pub name: String,

    /// Tax registration number, unique among live companies when present.
    #[validate(length(min = 1, max = 32, message = "Document must be at most 32 characters"))]
    pub document: Option<String>,

    #[validate(length(max = 32, message = "Phone too long"))]
    pub phone: Option<String>,

    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,

    pub is_active: bool,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl Company {
    pub fn new(
        name: String,
        document: Option<String>,
        phone: Option<String>,
        email: Option<String>,
        created_by: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        let company = Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            document: clean(document),
            phone: clean(phone),
            email: clean(email).map(|e| e.to_lowercase()),
            is_active: true,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        };

        company.validate()?;
        Ok(company)
    }

    pub fn update_details(
        &mut self,
        name: Option<String>,
        document: Option<String>,
        phone: Option<String>,
        email: Option<String>,
        is_active: Option<bool>,
        modified_by: Uuid,
    ) -> Result<(), validator::ValidationErrors> {
        if let Some(name) = name {
            self.name = name.trim().to_string();
        }
        if document.is_some() {
            self.document = clean(document);
        }
        if phone.is_some() {
            self.phone = clean(phone);
        }
        if email.is_some() {
            self.email = clean(email).map(|e| e.to_lowercase());
        }
        if let Some(is_active) = is_active {
            self.is_active = is_active;
        }
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);
        self.validate()
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

/// Trims optional text and turns blank input into `None`.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
