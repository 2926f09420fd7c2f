use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use servorder_core::services::{CreateClient, UpdateClient};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    pub store_id: Option<Uuid>,
    #[validate(length(min = 2, max = 120, message = "Name must be between 2 and 120 characters"))]
    pub name: String,
    #[validate(length(min = 8, max = 32, message = "Phone is required"))]
    pub phone: String,
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub document: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

impl From<CreateClientRequest> for CreateClient {
    fn from(req: CreateClientRequest) -> Self {
        Self {
            store_id: req.store_id,
            name: req.name,
            phone: req.phone,
            email: req.email,
            document: req.document,
            notes: req.notes,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate(length(min = 2, max = 120, message = "Name must be between 2 and 120 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 8, max = 32))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub document: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

impl From<UpdateClientRequest> for UpdateClient {
    fn from(req: UpdateClientRequest) -> Self {
        Self {
            name: req.name,
            phone: req.phone,
            email: req.email,
            document: req.document,
            notes: req.notes,
        }
    }
}
