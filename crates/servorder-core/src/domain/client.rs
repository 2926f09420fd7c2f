// ============================================================================
// Servorder Core - Client Entity
// File: crates/servorder-core/src/domain/client.rs
// Description: Customer of a store, reachable over WhatsApp
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::company::clean;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Client {
    pub id: Uuid,
    pub company_id: Uuid,
    pub store_id: Uuid,

    #[validate(length(min = 2, max = 120, message = "Client name must be between 2 and 120 characters"))]
    pub name: String,

    /// Digits-only international number used as the WhatsApp target.
    #[validate(length(min = 12, max = 15, message = "Phone must have between 12 and 15 digits"))]
    pub phone: String,

    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,

    #[validate(length(max = 32, message = "Document too long"))]
    pub document: Option<String>,

    #[validate(length(max = 1000, message = "Notes too long"))]
    pub notes: Option<String>,

    // Audit fields
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl Client {
    pub fn new(
        company_id: Uuid,
        store_id: Uuid,
        name: String,
        phone: String,
        email: Option<String>,
        document: Option<String>,
        notes: Option<String>,
        created_by: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        let client = Self {
            id: Uuid::new_v4(),
            company_id,
            store_id,
            name: name.trim().to_string(),
            phone,
            email: clean(email).map(|e| e.to_lowercase()),
            document: clean(document),
            notes: clean(notes),
            created_at: Utc::now(),
            created_by,
            modified_at: None,
            modified_by: None,
            removed_at: None,
            removed_by: None,
        };

        client.validate()?;
        Ok(client)
    }

    pub fn update_details(
        &mut self,
        name: Option<String>,
        phone: Option<String>,
        email: Option<String>,
        document: Option<String>,
        notes: Option<String>,
        modified_by: Uuid,
    ) -> Result<(), validator::ValidationErrors> {
        if let Some(name) = name {
            self.name = name.trim().to_string();
        }
        if let Some(phone) = phone {
            self.phone = phone;
        }
        if email.is_some() {
            self.email = clean(email).map(|e| e.to_lowercase());
        }
        if document.is_some() {
            self.document = clean(document);
        }
        if notes.is_some() {
            self.notes = clean(notes);
        }
        self.modified_at = Some(Utc::now());
        self.modified_by = Some(modified_by);
        self.validate()
    }

    pub fn soft_delete(&mut self, deleted_by: Uuid) {
        self.removed_at = Some(Utc::now());
        self.removed_by = Some(deleted_by);
    }

    pub fn is_deleted(&self) -> bool {
        self.removed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = Client::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "João Silva".to_string(),
            "5511987654321".to_string(),
            Some("JOAO@mail.com".to_string()),
            None,
            None,
            None,
        )
        .unwrap();
        assert_eq!(client.email.as_deref(), Some("joao@mail.com"));
    }

    #[test]
    fn test_phone_length_enforced() {
        let result = Client::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "João".to_string(),
            "12345".to_string(),
            None,
            None,
            None,
            None,
        );
        assert!(result.is_err());
    }
}
