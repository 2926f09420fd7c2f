use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use servorder_core::services::{CreateStore, UpdateStore};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStoreRequest {
    pub company_id: Option<Uuid>,
    #[validate(length(min = 2, max = 120, message = "Name must be between 2 and 120 characters"))]
    pub name: String,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

impl From<CreateStoreRequest> for CreateStore {
    fn from(req: CreateStoreRequest) -> Self {
        Self {
            company_id: req.company_id,
            name: req.name,
            address: req.address,
            phone: req.phone,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStoreRequest {
    #[validate(length(min = 2, max = 120, message = "Name must be between 2 and 120 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateStoreRequest> for UpdateStore {
    fn from(req: UpdateStoreRequest) -> Self {
        Self {
            name: req.name,
            address: req.address,
            phone: req.phone,
            is_active: req.is_active,
        }
    }
}
