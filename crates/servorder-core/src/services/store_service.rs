//! Store management

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use servorder_shared::{Page, Pagination};

use crate::access::Actor;
use crate::domain::{Role, Store};
use crate::error::DomainError;
use crate::repositories::{CompanyRepository, StoreFilter, StoreRepository};

#[derive(Debug, Clone, Default)]
pub struct CreateStore {
    /// Required for SUPER_ADMIN; defaults to the caller's company otherwise.
    pub company_id: Option<Uuid>,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateStore {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

pub struct StoreService {
    store_repo: Arc<dyn StoreRepository>,
    company_repo: Arc<dyn CompanyRepository>,
}

impl StoreService {
    pub fn new(store_repo: Arc<dyn StoreRepository>, company_repo: Arc<dyn CompanyRepository>) -> Self {
        Self {
            store_repo,
            company_repo,
        }
    }

    pub async fn create(&self, actor: &Actor, input: CreateStore) -> Result<Store, DomainError> {
        actor.require_role(Role::CompanyAdmin)?;

        let company_id = match (actor.company_id, input.company_id) {
            (Some(own), Some(requested)) if own != requested => return Err(DomainError::CompanyNotFound),
            (Some(own), _) => own,
            (None, Some(requested)) => requested,
            (None, None) => {
                return Err(DomainError::ValidationError("company_id is required".to_string()))
            }
        };

        let company = self
            .company_repo
            .find_by_id(&company_id)
            .await?
            .ok_or(DomainError::CompanyNotFound)?;
        if !company.is_active {
            return Err(DomainError::ValidationError("Company is not active".to_string()));
        }

        let store = Store::new(company.id, input.name, input.address, input.phone, Some(actor.user_id))?;
        let created = self.store_repo.create(&store).await?;
        info!("Store {} created in company {} by {}", created.id, company.id, actor.user_id);
        Ok(created)
    }

    /// Loads a store the actor can see.
    pub async fn get(&self, actor: &Actor, id: &Uuid) -> Result<Store, DomainError> {
        let store = self
            .store_repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::StoreNotFound)?;
        if !actor.can_access_store(store.company_id, store.id) {
            return Err(DomainError::StoreNotFound);
        }
        Ok(store)
    }

    pub async fn list(
        &self,
        actor: &Actor,
        company_id: Option<Uuid>,
        search: Option<String>,
        pagination: Pagination,
    ) -> Result<Page<Store>, DomainError> {
        let filter = StoreFilter {
            scope: actor.narrow(company_id, None)?,
            search,
        };
        self.store_repo.list(&filter, pagination).await
    }

    pub async fn update(&self, actor: &Actor, id: &Uuid, input: UpdateStore) -> Result<Store, DomainError> {
        let mut store = self.get(actor, id).await?;
        actor.require_role(Role::CompanyAdmin)?;

        store.update_details(input.name, input.address, input.phone, input.is_active, actor.user_id)?;
        let updated = self.store_repo.update(&store).await?;
        info!("Store {} updated by {}", updated.id, actor.user_id);
        Ok(updated)
    }

    pub async fn delete(&self, actor: &Actor, id: &Uuid) -> Result<(), DomainError> {
        let mut store = self.get(actor, id).await?;
        actor.require_role(Role::CompanyAdmin)?;

        store.soft_delete(actor.user_id);
        self.store_repo.update(&store).await?;
        info!("Store {} deleted by {}", id, actor.user_id);
        Ok(())
    }
}
