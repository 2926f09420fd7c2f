// ============================================================================
// Servorder Core - Store Entity
// File: crates/servorder-core/src/domain/store.rs
// Description: Store operated by a company; owns the order number sequence
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::company::clean;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Store {
    pub id: Uuid,
    pub company_id: Uuid,

    #[validate(length(min = 2, max = 120, message = "Store name must be between 2 and 120 characters"))]
    pub name: String,

    #[validate(length(max = 255, message = "Address too long"))]
    pub address: Option<String>,

    #[validate(length(max = 32, message = "Phone too long"))]
    pub phone: Option<String>,

    pub is_active: bool,

    /// Number handed to the next service order created in this store.
    pub next_order_number: i64,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl Store {
    pub fn new(
        company_id: Uuid,
        name: String,
        address: Option<String>,
        phone: Option<String>,
        created_by: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        let store = Self {
            id: Uuid::new_v4(),
            company_id,
            name: name.trim().to_string(),
            address: clean(address),
            phone: clean(phone),
            is_active: true,
            next_order_number: 1,
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        };

        store.validate()?;
        Ok(store)
    }

    pub fn update_details(
        &mut self,
        name: Option<String>,
        address: Option<String>,
        phone: Option<String>,
        is_active: Option<bool>,
        modified_by: Uuid,
    ) -> Result<(), validator::ValidationErrors> {
        if let Some(name) = name {
            self.name = name.trim().to_string();
        }
        if address.is_some() {
            self.address = clean(address);
        }
        if phone.is_some() {
            self.phone = clean(phone);
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
