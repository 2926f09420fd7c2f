// ============================================================================
// Servorder Infrastructure - In-Memory Repositories
// File: crates/servorder-infrastructure/src/memory/mod.rs
// Description: Process-local implementation of every repository port
// ============================================================================
//! Backs the API integration tests and the server's database-less mode.
//! One [`MemoryStore`] implements all repository traits so that order
//! creation can advance the store's number sequence under the same lock.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use servorder_core::access::TenantScope;
use servorder_core::domain::{
    Client, Company, NotificationStatus, OrderStatus, ServiceOrder, StatusChange, Store, User,
};
use servorder_core::error::DomainError;
use servorder_core::repositories::{
    ClientFilter, ClientRepository, CompanyFilter, CompanyRepository, ServiceOrderFilter, ServiceOrderRepository,
    StatusTotals, StoreFilter, StoreRepository, UserFilter, UserRepository,
};
use servorder_shared::{Page, Pagination};

#[derive(Default)]
struct Tables {
    companies: HashMap<Uuid, Company>,
    stores: HashMap<Uuid, Store>,
    users: HashMap<Uuid, User>,
    clients: HashMap<Uuid, Client>,
    orders: HashMap<Uuid, ServiceOrder>,
    history: Vec<StatusChange>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T>(items: Vec<T>, pagination: Pagination) -> Page<T> {
    let total = items.len() as i64;
    let offset = pagination.offset().max(0) as usize;
    let limit = pagination.limit().max(0) as usize;
    let items = items.into_iter().skip(offset).take(limit).collect();
    Page::new(items, total, pagination)
}

fn matches(search: &Option<String>, fields: &[Option<&str>]) -> bool {
    let Some(term) = search.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let term = term.to_lowercase();
    fields
        .iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&term))
}

fn in_scope(scope: &TenantScope, company_id: Uuid, store_id: Option<Uuid>) -> bool {
    if scope.company_id.is_some_and(|c| c != company_id) {
        return false;
    }
    scope.store_id.is_none() || scope.store_id == store_id
}

#[async_trait]
impl CompanyRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Company>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.companies.get(id).filter(|c| !c.is_deleted()).cloned())
    }

    async fn find_by_document(&self, document: &str) -> Result<Option<Company>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .companies
            .values()
            .find(|c| !c.is_deleted() && c.document.as_deref() == Some(document))
            .cloned())
    }

    async fn list(&self, filter: &CompanyFilter, pagination: Pagination) -> Result<Page<Company>, DomainError> {
        let tables = self.tables.read().await;
        let mut items: Vec<Company> = tables
            .companies
            .values()
            .filter(|c| !c.is_deleted())
            .filter(|c| filter.company_id.is_none_or(|id| id == c.id))
            .filter(|c| matches(&filter.search, &[Some(c.name.as_str()), c.document.as_deref()]))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(items, pagination))
    }

    async fn create(&self, company: &Company) -> Result<Company, DomainError> {
        let mut tables = self.tables.write().await;
        if let Some(document) = &company.document {
            if tables
                .companies
                .values()
                .any(|c| !c.is_deleted() && c.document.as_ref() == Some(document))
            {
                return Err(DomainError::CompanyDocumentAlreadyExists(document.clone()));
            }
        }
        tables.companies.insert(company.id, company.clone());
        Ok(company.clone())
    }

    async fn update(&self, company: &Company) -> Result<Company, DomainError> {
        let mut tables = self.tables.write().await;
        match tables.companies.get_mut(&company.id) {
            Some(existing) if !existing.is_deleted() => {
                *existing = company.clone();
                Ok(company.clone())
            }
            _ => Err(DomainError::CompanyNotFound),
        }
    }
}

#[async_trait]
impl StoreRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Store>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.stores.get(id).filter(|s| !s.is_deleted()).cloned())
    }

    async fn list(&self, filter: &StoreFilter, pagination: Pagination) -> Result<Page<Store>, DomainError> {
        let tables = self.tables.read().await;
        let mut items: Vec<Store> = tables
            .stores
            .values()
            .filter(|s| !s.is_deleted())
            .filter(|s| in_scope(&filter.scope, s.company_id, Some(s.id)))
            .filter(|s| matches(&filter.search, &[Some(s.name.as_str())]))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(items, pagination))
    }

    async fn create(&self, store: &Store) -> Result<Store, DomainError> {
        let mut tables = self.tables.write().await;
        tables.stores.insert(store.id, store.clone());
        Ok(store.clone())
    }

    async fn update(&self, store: &Store) -> Result<Store, DomainError> {
        let mut tables = self.tables.write().await;
        match tables.stores.get_mut(&store.id) {
            Some(existing) if !existing.is_deleted() => {
                let next_order_number = existing.next_order_number;
                *existing = store.clone();
                existing.next_order_number = next_order_number;
                Ok(existing.clone())
            }
            _ => Err(DomainError::StoreNotFound),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(id).filter(|u| !u.is_deleted()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email = email.trim().to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| !u.is_deleted() && u.email == email)
            .cloned())
    }

    async fn list(&self, filter: &UserFilter, pagination: Pagination) -> Result<Page<User>, DomainError> {
        let tables = self.tables.read().await;
        let mut items: Vec<User> = tables
            .users
            .values()
            .filter(|u| !u.is_deleted())
            .filter(|u| match u.company_id {
                Some(company_id) => in_scope(&filter.scope, company_id, u.store_id),
                None => filter.scope == TenantScope::default(),
            })
            .filter(|u| filter.role.is_none_or(|r| r == u.role))
            .filter(|u| matches(&filter.search, &[Some(u.name.as_str()), Some(u.email.as_str())]))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(items, pagination))
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| !u.is_deleted() && u.email == user.email) {
            return Err(DomainError::EmailAlreadyExists(user.email.clone()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && !u.is_deleted() && u.email == user.email)
        {
            return Err(DomainError::EmailAlreadyExists(user.email.clone()));
        }
        match tables.users.get_mut(&user.id) {
            Some(existing) if !existing.is_deleted() => {
                *existing = user.clone();
                Ok(user.clone())
            }
            _ => Err(DomainError::UserNotFound),
        }
    }
}

#[async_trait]
impl ClientRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Client>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.clients.get(id).filter(|c| !c.is_deleted()).cloned())
    }

    async fn list(&self, filter: &ClientFilter, pagination: Pagination) -> Result<Page<Client>, DomainError> {
        let tables = self.tables.read().await;
        let mut items: Vec<Client> = tables
            .clients
            .values()
            .filter(|c| !c.is_deleted())
            .filter(|c| in_scope(&filter.scope, c.company_id, Some(c.store_id)))
            .filter(|c| matches(&filter.search, &[Some(c.name.as_str()), Some(c.phone.as_str())]))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(items, pagination))
    }

    async fn create(&self, client: &Client) -> Result<Client, DomainError> {
        let mut tables = self.tables.write().await;
        tables.clients.insert(client.id, client.clone());
        Ok(client.clone())
    }

    async fn update(&self, client: &Client) -> Result<Client, DomainError> {
        let mut tables = self.tables.write().await;
        match tables.clients.get_mut(&client.id) {
            Some(existing) if !existing.is_deleted() => {
                *existing = client.clone();
                Ok(client.clone())
            }
            _ => Err(DomainError::ClientNotFound),
        }
    }
}

#[async_trait]
impl ServiceOrderRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ServiceOrder>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(id).filter(|o| !o.is_deleted()).cloned())
    }

    async fn list(
        &self,
        filter: &ServiceOrderFilter,
        pagination: Pagination,
    ) -> Result<Page<ServiceOrder>, DomainError> {
        let tables = self.tables.read().await;
        let mut items: Vec<ServiceOrder> = tables
            .orders
            .values()
            .filter(|o| !o.is_deleted())
            .filter(|o| in_scope(&filter.scope, o.company_id, Some(o.store_id)))
            .filter(|o| filter.client_id.is_none_or(|c| c == o.client_id))
            .filter(|o| filter.status.is_none_or(|s| s == o.status))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.number.cmp(&a.number)));
        Ok(paginate(items, pagination))
    }

    async fn create(&self, order: &ServiceOrder, initial: &StatusChange) -> Result<ServiceOrder, DomainError> {
        let mut tables = self.tables.write().await;
        let store = tables
            .stores
            .get_mut(&order.store_id)
            .filter(|s| !s.is_deleted())
            .ok_or(DomainError::StoreNotFound)?;

        let mut stored = order.clone();
        stored.number = store.next_order_number;
        store.next_order_number += 1;

        tables.orders.insert(stored.id, stored.clone());
        tables.history.push(initial.clone());
        Ok(stored)
    }

    async fn update(&self, order: &ServiceOrder) -> Result<ServiceOrder, DomainError> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .orders
            .get_mut(&order.id)
            .filter(|o| !o.is_deleted())
            .ok_or(DomainError::ServiceOrderNotFound)?;
        existing.ensure_editable()?;

        existing.description = order.description.clone();
        existing.items = order.items.clone();
        existing.total_cents = order.total_cents;
        existing.modified_at = order.modified_at;
        existing.modified_by = order.modified_by;
        Ok(existing.clone())
    }

    async fn soft_delete(&self, order: &ServiceOrder) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .orders
            .get_mut(&order.id)
            .filter(|o| !o.is_deleted())
            .ok_or(DomainError::ServiceOrderNotFound)?;
        if existing.status == OrderStatus::Paid {
            return Err(DomainError::OrderNotEditable(existing.status));
        }

        existing.removed_at = order.removed_at;
        existing.removed_by = order.removed_by;
        Ok(())
    }

    async fn update_status(&self, order: &ServiceOrder, change: &StatusChange) -> Result<ServiceOrder, DomainError> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .orders
            .get_mut(&order.id)
            .filter(|o| !o.is_deleted())
            .ok_or(DomainError::ServiceOrderNotFound)?;
        if Some(existing.status) != change.from_status {
            return Err(DomainError::InvalidStatusTransition {
                from: existing.status,
                to: change.to_status,
            });
        }

        existing.status = order.status;
        existing.started_at = order.started_at;
        existing.paused_at = order.paused_at;
        existing.finished_at = order.finished_at;
        existing.paid_at = order.paid_at;
        existing.modified_at = order.modified_at;
        existing.modified_by = order.modified_by;
        let updated = existing.clone();

        tables.history.push(change.clone());
        Ok(updated)
    }

    async fn record_notification(
        &self,
        change_id: &Uuid,
        status: NotificationStatus,
        error: Option<String>,
    ) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if let Some(change) = tables.history.iter_mut().find(|c| c.id == *change_id) {
            change.record_notification(status, error);
        }
        Ok(())
    }

    async fn history(&self, order_id: &Uuid) -> Result<Vec<StatusChange>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .history
            .iter()
            .filter(|c| c.order_id == *order_id)
            .cloned()
            .collect())
    }

    async fn status_totals(&self, scope: &TenantScope) -> Result<Vec<StatusTotals>, DomainError> {
        let tables = self.tables.read().await;
        let mut totals: Vec<StatusTotals> = Vec::new();
        for order in tables
            .orders
            .values()
            .filter(|o| !o.is_deleted() && in_scope(scope, o.company_id, Some(o.store_id)))
        {
            match totals.iter_mut().find(|t| t.status == order.status) {
                Some(entry) => {
                    entry.count += 1;
                    entry.total_cents += order.total_cents;
                }
                None => totals.push(StatusTotals {
                    status: order.status,
                    count: 1,
                    total_cents: order.total_cents,
                }),
            }
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use servorder_core::domain::NewServiceItem;

    async fn seeded() -> (MemoryStore, Store, Client) {
        let repo = MemoryStore::new();
        let company = Company::new("Oficina".to_string(), None, None, None, None).unwrap();
        CompanyRepository::create(&repo, &company).await.unwrap();
        let store = Store::new(company.id, "Matriz".to_string(), None, None, None).unwrap();
        StoreRepository::create(&repo, &store).await.unwrap();
        let client = Client::new(
            company.id,
            store.id,
            "Ana Costa".to_string(),
            "5511912345678".to_string(),
            None,
            None,
            None,
            None,
        )
        .unwrap();
        ClientRepository::create(&repo, &client).await.unwrap();
        (repo, store, client)
    }

    fn new_order(client: &Client) -> ServiceOrder {
        let items = vec![NewServiceItem {
            description: "Revisão".to_string(),
            quantity: 1,
            unit_price_cents: 10_000,
        }];
        ServiceOrder::new(client.company_id, client.store_id, client.id, None, items, Uuid::new_v4()).unwrap()
    }

    #[tokio::test]
    async fn test_order_numbers_are_sequential_per_store() {
        let (repo, store, client) = seeded().await;

        for expected in 1..=3 {
            let order = new_order(&client);
            let initial = StatusChange::initial(order.id, Uuid::new_v4());
            let stored = ServiceOrderRepository::create(&repo, &order, &initial).await.unwrap();
            assert_eq!(stored.number, expected);
        }

        let store = StoreRepository::find_by_id(&repo, &store.id).await.unwrap().unwrap();
        assert_eq!(store.next_order_number, 4);
    }

    #[tokio::test]
    async fn test_store_update_keeps_sequence() {
        let (repo, store, client) = seeded().await;
        let order = new_order(&client);
        let initial = StatusChange::initial(order.id, Uuid::new_v4());
        ServiceOrderRepository::create(&repo, &order, &initial).await.unwrap();

        let mut stale = store.clone();
        stale.name = "Filial".to_string();
        let updated = StoreRepository::update(&repo, &stale).await.unwrap();
        assert_eq!(updated.next_order_number, 2);
    }

    #[tokio::test]
    async fn test_stale_status_update_is_rejected() {
        let (repo, _store, client) = seeded().await;
        let mut order = new_order(&client);
        let initial = StatusChange::initial(order.id, Uuid::new_v4());
        ServiceOrderRepository::create(&repo, &order, &initial).await.unwrap();

        let mut first = order.clone();
        let change = first.transition_to(OrderStatus::InProgress, Uuid::new_v4(), None).unwrap();
        repo.update_status(&first, &change).await.unwrap();

        let stale = order.transition_to(OrderStatus::InProgress, Uuid::new_v4(), None).unwrap();
        let err = repo.update_status(&order, &stale).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidStatusTransition { .. }));

        let history = repo.history(&order.id).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_edit_from_stale_snapshot_is_rejected_once_finished() {
        let (repo, _store, client) = seeded().await;
        let order = new_order(&client);
        let initial = StatusChange::initial(order.id, Uuid::new_v4());
        ServiceOrderRepository::create(&repo, &order, &initial).await.unwrap();
        let snapshot = order.clone();

        let mut moved = order.clone();
        for next in [OrderStatus::InProgress, OrderStatus::Finished] {
            let change = moved.transition_to(next, Uuid::new_v4(), None).unwrap();
            repo.update_status(&moved, &change).await.unwrap();
        }

        let mut edited = snapshot;
        let items = vec![NewServiceItem {
            description: "Troca de placa".to_string(),
            quantity: 1,
            unit_price_cents: 999_999,
        }];
        edited.replace_items(items, Uuid::new_v4()).unwrap();
        let err = ServiceOrderRepository::update(&repo, &edited).await.unwrap_err();
        assert!(matches!(err, DomainError::OrderNotEditable(OrderStatus::Finished)));

        let stored = ServiceOrderRepository::find_by_id(&repo, &order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Finished);
        assert_eq!(stored.total_cents, 10_000);
    }

    #[tokio::test]
    async fn test_delete_from_stale_snapshot_is_rejected_once_paid() {
        let (repo, _store, client) = seeded().await;
        let order = new_order(&client);
        let initial = StatusChange::initial(order.id, Uuid::new_v4());
        ServiceOrderRepository::create(&repo, &order, &initial).await.unwrap();
        let snapshot = order.clone();

        let mut moved = order.clone();
        for next in [OrderStatus::InProgress, OrderStatus::Finished, OrderStatus::Paid] {
            let change = moved.transition_to(next, Uuid::new_v4(), None).unwrap();
            repo.update_status(&moved, &change).await.unwrap();
        }

        let mut deleted = snapshot;
        deleted.soft_delete(Uuid::new_v4());
        let err = repo.soft_delete(&deleted).await.unwrap_err();
        assert!(matches!(err, DomainError::OrderNotEditable(OrderStatus::Paid)));
        assert!(ServiceOrderRepository::find_by_id(&repo, &order.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_status_totals_respect_scope() {
        let (repo, store, client) = seeded().await;
        let order = new_order(&client);
        let initial = StatusChange::initial(order.id, Uuid::new_v4());
        ServiceOrderRepository::create(&repo, &order, &initial).await.unwrap();

        let mine = TenantScope {
            company_id: Some(store.company_id),
            store_id: Some(store.id),
        };
        let totals = repo.status_totals(&mine).await.unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].count, 1);
        assert_eq!(totals[0].total_cents, 10_000);

        let other = TenantScope {
            company_id: Some(Uuid::new_v4()),
            store_id: None,
        };
        assert!(repo.status_totals(&other).await.unwrap().is_empty());
    }
}
