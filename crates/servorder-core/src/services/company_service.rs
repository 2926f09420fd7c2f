//! Company management (SUPER_ADMIN territory)

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use servorder_shared::{Page, Pagination};

use crate::access::Actor;
use crate::domain::{Company, Role};
use crate::error::DomainError;
use crate::repositories::{CompanyFilter, CompanyRepository};

#[derive(Debug, Clone, Default)]
pub struct CreateCompany {
    pub name: String,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

pub struct CompanyService {
    company_repo: Arc<dyn CompanyRepository>,
}

impl CompanyService {
    pub fn new(company_repo: Arc<dyn CompanyRepository>) -> Self {
        Self { company_repo }
    }

    pub async fn create(&self, actor: &Actor, input: CreateCompany) -> Result<Company, DomainError> {
        actor.require_role(Role::SuperAdmin)?;

        let company = Company::new(input.name, input.document, input.phone, input.email, Some(actor.user_id))?;
        self.ensure_document_free(&company, None).await?;

        let created = self.company_repo.create(&company).await?;
        info!("Company {} created by {}", created.id, actor.user_id);
        Ok(created)
    }

    pub async fn get(&self, actor: &Actor, id: &Uuid) -> Result<Company, DomainError> {
        if !actor.can_access_company(*id) {
            return Err(DomainError::CompanyNotFound);
        }
        self.company_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::CompanyNotFound)
    }

    pub async fn list(
        &self,
        actor: &Actor,
        search: Option<String>,
        pagination: Pagination,
    ) -> Result<Page<Company>, DomainError> {
        let filter = CompanyFilter {
            company_id: if actor.is_super_admin() { None } else { actor.company_id },
            search,
        };
        self.company_repo.list(&filter, pagination).await
    }

    pub async fn update(&self, actor: &Actor, id: &Uuid, input: UpdateCompany) -> Result<Company, DomainError> {
        actor.require_role(Role::SuperAdmin)?;

        let mut company = self.get(actor, id).await?;
        company.update_details(
            input.name,
            input.document,
            input.phone,
            input.email,
            input.is_active,
            actor.user_id,
        )?;
        self.ensure_document_free(&company, Some(company.id)).await?;

        let updated = self.company_repo.update(&company).await?;
        info!("Company {} updated by {}", updated.id, actor.user_id);
        Ok(updated)
    }

    pub async fn delete(&self, actor: &Actor, id: &Uuid) -> Result<(), DomainError> {
        actor.require_role(Role::SuperAdmin)?;

        let mut company = self.get(actor, id).await?;
        company.soft_delete(actor.user_id);
        self.company_repo.update(&company).await?;
        info!("Company {} deleted by {}", id, actor.user_id);
        Ok(())
    }

    async fn ensure_document_free(&self, company: &Company, own_id: Option<Uuid>) -> Result<(), DomainError> {
        let Some(document) = company.document.as_deref() else {
            return Ok(());
        };
        match self.company_repo.find_by_document(document).await? {
            Some(existing) if Some(existing.id) != own_id => {
                Err(DomainError::CompanyDocumentAlreadyExists(document.to_string()))
            }
            _ => Ok(()),
        }
    }
}
