//! Client (customer) management. Clients belong to one store and are the
//! WhatsApp targets for order status notices.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use servorder_shared::utils::{mask_phone, normalize_phone};
use servorder_shared::{Page, Pagination};

use crate::access::Actor;
use crate::domain::{Client, Role};
use crate::error::DomainError;
use crate::repositories::{ClientFilter, ClientRepository, StoreRepository};

#[derive(Debug, Clone, Default)]
pub struct CreateClient {
    /// Ignored for store-bound callers, who always create in their own store.
    pub store_id: Option<Uuid>,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub document: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub document: Option<String>,
    pub notes: Option<String>,
}

pub struct ClientService {
    client_repo: Arc<dyn ClientRepository>,
    store_repo: Arc<dyn StoreRepository>,
    country_code: String,
}

impl ClientService {
    pub fn new(
        client_repo: Arc<dyn ClientRepository>,
        store_repo: Arc<dyn StoreRepository>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            client_repo,
            store_repo,
            country_code: country_code.into(),
        }
    }

    pub async fn create(&self, actor: &Actor, input: CreateClient) -> Result<Client, DomainError> {
        let store_id = actor.target_store(input.store_id)?;
        let store = self
            .store_repo
            .find_by_id(&store_id)
            .await?
            .filter(|s| actor.can_access_store(s.company_id, s.id))
            .ok_or(DomainError::StoreNotFound)?;
        if !store.is_active {
            return Err(DomainError::ValidationError("Store is not active".to_string()));
        }

        let phone = self.phone(&input.phone)?;
        let client = Client::new(
            store.company_id,
            store.id,
            input.name,
            phone,
            input.email,
            input.document,
            input.notes,
            Some(actor.user_id),
        )?;
        let created = self.client_repo.create(&client).await?;
        info!(
            "Client {} ({}) created in store {} by {}",
            created.id,
            mask_phone(&created.phone),
            store.id,
            actor.user_id
        );
        Ok(created)
    }

    pub async fn get(&self, actor: &Actor, id: &Uuid) -> Result<Client, DomainError> {
        self.client_repo
            .find_by_id(id)
            .await?
            .filter(|c| actor.can_access_store(c.company_id, c.store_id))
            .ok_or(DomainError::ClientNotFound)
    }

    pub async fn list(
        &self,
        actor: &Actor,
        company_id: Option<Uuid>,
        store_id: Option<Uuid>,
        search: Option<String>,
        pagination: Pagination,
    ) -> Result<Page<Client>, DomainError> {
        let filter = ClientFilter {
            scope: actor.narrow(company_id, store_id)?,
            search,
        };
        self.client_repo.list(&filter, pagination).await
    }

    pub async fn update(&self, actor: &Actor, id: &Uuid, input: UpdateClient) -> Result<Client, DomainError> {
        let mut client = self.get(actor, id).await?;
        let phone = input.phone.as_deref().map(|p| self.phone(p)).transpose()?;

        client.update_details(input.name, phone, input.email, input.document, input.notes, actor.user_id)?;
        let updated = self.client_repo.update(&client).await?;
        info!("Client {} updated by {}", updated.id, actor.user_id);
        Ok(updated)
    }

    pub async fn delete(&self, actor: &Actor, id: &Uuid) -> Result<(), DomainError> {
        let mut client = self.get(actor, id).await?;
        actor.require_role(Role::Manager)?;

        client.soft_delete(actor.user_id);
        self.client_repo.update(&client).await?;
        info!("Client {} deleted by {}", id, actor.user_id);
        Ok(())
    }

    fn phone(&self, raw: &str) -> Result<String, DomainError> {
        normalize_phone(raw, &self.country_code).ok_or_else(|| DomainError::InvalidPhone(raw.to_string()))
    }
}
