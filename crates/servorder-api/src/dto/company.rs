use serde::Deserialize;
use validator::Validate;

use servorder_core::services::{CreateCompany, UpdateCompany};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 2, max = 120, message = "Name must be between 2 and 120 characters"))]
    pub name: String,
    #[validate(length(max = 32))]
    pub document: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
}

impl From<CreateCompanyRequest> for CreateCompany {
    fn from(req: CreateCompanyRequest) -> Self {
        Self {
            name: req.name,
            document: req.document,
            phone: req.phone,
            email: req.email,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    #[validate(length(min = 2, max = 120, message = "Name must be between 2 and 120 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 32))]
    pub document: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateCompanyRequest> for UpdateCompany {
    fn from(req: UpdateCompanyRequest) -> Self {
        Self {
            name: req.name,
            document: req.document,
            phone: req.phone,
            email: req.email,
            is_active: req.is_active,
        }
    }
}
