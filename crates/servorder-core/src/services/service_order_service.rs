// ============================================================================
// Servorder Core - Service Order Service
// File: crates/servorder-core/src/services/service_order_service.rs
// Description: Order lifecycle, status history and client notification
// ============================================================================

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use servorder_shared::{Page, Pagination};

use crate::access::Actor;
use crate::domain::{NewServiceItem, NotificationStatus, OrderStatus, Role, ServiceOrder, StatusChange};
use crate::error::DomainError;
use crate::notifier::{StatusNotice, StatusNotifier};
use crate::repositories::{ClientRepository, ServiceOrderFilter, ServiceOrderRepository, StoreRepository};

#[derive(Debug, Clone, Default)]
pub struct CreateServiceOrder {
    /// Ignored for store-bound callers.
    pub store_id: Option<Uuid>,
    pub client_id: Uuid,
    pub description: Option<String>,
    pub items: Vec<NewServiceItem>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateServiceOrder {
    pub description: Option<String>,
    pub items: Option<Vec<NewServiceItem>>,
}

#[derive(Debug, Clone)]
pub struct ChangeStatus {
    pub status: OrderStatus,
    pub note: Option<String>,
}

/// Order after a status change together with the history entry, whose
/// notification fields carry the delivery outcome.
#[derive(Debug, Clone)]
pub struct StatusChangeResult {
    pub order: ServiceOrder,
    pub change: StatusChange,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceOrderQuery {
    pub company_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

pub struct ServiceOrderService {
    order_repo: Arc<dyn ServiceOrderRepository>,
    client_repo: Arc<dyn ClientRepository>,
    store_repo: Arc<dyn StoreRepository>,
    notifier: Option<Arc<dyn StatusNotifier>>,
}

impl ServiceOrderService {
    pub fn new(
        order_repo: Arc<dyn ServiceOrderRepository>,
        client_repo: Arc<dyn ClientRepository>,
        store_repo: Arc<dyn StoreRepository>,
        notifier: Option<Arc<dyn StatusNotifier>>,
    ) -> Self {
        Self {
            order_repo,
            client_repo,
            store_repo,
            notifier,
        }
    }

    /// Opens a RECEIVED order and notifies the client. Returns the stored
    /// order and its initial history entry.
    pub async fn create(&self, actor: &Actor, input: CreateServiceOrder) -> Result<StatusChangeResult, DomainError> {
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

        let client = self
            .client_repo
            .find_by_id(&input.client_id)
            .await?
            .filter(|c| actor.can_access_store(c.company_id, c.store_id))
            .ok_or(DomainError::ClientNotFound)?;
        if client.store_id != store.id {
            return Err(DomainError::ValidationError(
                "Client does not belong to this store".to_string(),
            ));
        }

        let order = ServiceOrder::new(
            store.company_id,
            store.id,
            client.id,
            input.description,
            input.items,
            actor.user_id,
        )?;
        let initial = StatusChange::initial(order.id, actor.user_id);
        let order = self.order_repo.create(&order, &initial).await?;
        info!(
            "Service order #{} ({}) opened in store {} by {}",
            order.number, order.id, store.id, actor.user_id
        );

        let change = self.notify(&order, initial).await;
        Ok(StatusChangeResult { order, change })
    }

    pub async fn get(&self, actor: &Actor, id: &Uuid) -> Result<ServiceOrder, DomainError> {
        self.order_repo
            .find_by_id(id)
            .await?
            .filter(|o| actor.can_access_store(o.company_id, o.store_id))
            .ok_or(DomainError::ServiceOrderNotFound)
    }

    pub async fn list(
        &self,
        actor: &Actor,
        query: ServiceOrderQuery,
        pagination: Pagination,
    ) -> Result<Page<ServiceOrder>, DomainError> {
        let filter = ServiceOrderFilter {
            scope: actor.narrow(query.company_id, query.store_id)?,
            client_id: query.client_id,
            status: query.status,
        };
        self.order_repo.list(&filter, pagination).await
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &Uuid,
        input: UpdateServiceOrder,
    ) -> Result<ServiceOrder, DomainError> {
        let mut order = self.get(actor, id).await?;
        order.ensure_editable()?;

        if let Some(items) = input.items {
            order.replace_items(items, actor.user_id)?;
        }
        if input.description.is_some() {
            order.set_description(input.description, actor.user_id)?;
        }

        let updated = self.order_repo.update(&order).await?;
        info!("Service order {} updated by {}", updated.id, actor.user_id);
        Ok(updated)
    }

    pub async fn delete(&self, actor: &Actor, id: &Uuid) -> Result<(), DomainError> {
        let mut order = self.get(actor, id).await?;
        actor.require_role(Role::Manager)?;
        if order.status == OrderStatus::Paid {
            return Err(DomainError::OrderNotEditable(order.status));
        }

        order.soft_delete(actor.user_id);
        self.order_repo.soft_delete(&order).await?;
        info!("Service order {} deleted by {}", id, actor.user_id);
        Ok(())
    }

    pub async fn change_status(
        &self,
        actor: &Actor,
        id: &Uuid,
        input: ChangeStatus,
    ) -> Result<StatusChangeResult, DomainError> {
        let mut order = self.get(actor, id).await?;
        if input.status == OrderStatus::Paid {
            actor.require_role(Role::Manager)?;
        }

        let from = order.status;
        let change = order.transition_to(input.status, actor.user_id, input.note)?;
        let order = self.order_repo.update_status(&order, &change).await?;
        info!(
            "Service order {} moved {} -> {} by {}",
            order.id,
            from.as_str(),
            order.status.as_str(),
            actor.user_id
        );

        let change = self.notify(&order, change).await;
        Ok(StatusChangeResult { order, change })
    }

    pub async fn history(&self, actor: &Actor, id: &Uuid) -> Result<Vec<StatusChange>, DomainError> {
        let order = self.get(actor, id).await?;
        self.order_repo.history(&order.id).await
    }

    /// Sends the notice for `change` and stores the outcome. Never fails: a
    /// delivery problem only shows up on the returned history entry.
    async fn notify(&self, order: &ServiceOrder, mut change: StatusChange) -> StatusChange {
        let (status, error) = match &self.notifier {
            None => (NotificationStatus::Skipped, None),
            Some(notifier) => match self.build_notice(order).await {
                Ok(Some(notice)) => match notifier.notify(&notice).await {
                    Ok(()) => (NotificationStatus::Sent, None),
                    Err(e) => {
                        warn!("Notification for order {} failed: {}", order.id, e);
                        (NotificationStatus::Failed, Some(e.to_string()))
                    }
                },
                Ok(None) => (NotificationStatus::Skipped, None),
                Err(e) => {
                    warn!("Could not build notification for order {}: {}", order.id, e);
                    (NotificationStatus::Failed, Some(e.to_string()))
                }
            },
        };

        change.record_notification(status, error.clone());
        if let Err(e) = self.order_repo.record_notification(&change.id, status, error).await {
            warn!("Could not record notification outcome for change {}: {}", change.id, e);
        }
        change
    }

    /// `None` when the client or store is gone.
    async fn build_notice(&self, order: &ServiceOrder) -> Result<Option<StatusNotice>, DomainError> {
        let Some(client) = self.client_repo.find_by_id(&order.client_id).await? else {
            return Ok(None);
        };
        let Some(store) = self.store_repo.find_by_id(&order.store_id).await? else {
            return Ok(None);
        };
        Ok(Some(StatusNotice {
            phone: client.phone,
            client_name: client.name,
            store_name: store.name,
            order_number: order.number,
            status: order.status,
            total_cents: order.total_cents,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Client, Store};
    use crate::notifier::{MockStatusNotifier, NotificationError};
    use crate::repositories::{MockClientRepository, MockServiceOrderRepository, MockStoreRepository};
    use crate::services::test_support::{client, company_admin, store, store_actor};

    fn items() -> Vec<NewServiceItem> {
        vec![
            NewServiceItem {
                description: "Troca de tela".to_string(),
                quantity: 1,
                unit_price_cents: 35_000,
            },
            NewServiceItem {
                description: "Película".to_string(),
                quantity: 2,
                unit_price_cents: 2_500,
            },
        ]
    }

    fn order_for(client: &Client, actor: &Actor) -> ServiceOrder {
        let mut order =
            ServiceOrder::new(client.company_id, client.store_id, client.id, None, items(), actor.user_id).unwrap();
        order.number = 7;
        order
    }

    fn lookups(store: &Store, client: &Client) -> (MockStoreRepository, MockClientRepository) {
        let (store, client) = (store.clone(), client.clone());
        let mut stores = MockStoreRepository::new();
        stores.expect_find_by_id().returning(move |_| Ok(Some(store.clone())));
        let mut clients = MockClientRepository::new();
        clients.expect_find_by_id().returning(move |_| Ok(Some(client.clone())));
        (stores, clients)
    }

    fn service(
        orders: MockServiceOrderRepository,
        clients: MockClientRepository,
        stores: MockStoreRepository,
        notifier: Option<MockStatusNotifier>,
    ) -> ServiceOrderService {
        ServiceOrderService::new(
            Arc::new(orders),
            Arc::new(clients),
            Arc::new(stores),
            notifier.map(|n| Arc::new(n) as Arc<dyn StatusNotifier>),
        )
    }

    #[tokio::test]
    async fn test_create_assigns_number_and_notifies() {
        let store = store(Uuid::new_v4());
        let client = client(&store);
        let actor = store_actor(Role::Employee, &store);
        let (stores, clients) = lookups(&store, &client);

        let mut orders = MockServiceOrderRepository::new();
        orders
            .expect_create()
            .withf(|o, initial| {
                o.total_cents == 40_000 && initial.from_status.is_none() && initial.to_status == OrderStatus::Received
            })
            .returning(|o, _| {
                let mut stored = o.clone();
                stored.number = 1;
                Ok(stored)
            });
        orders
            .expect_record_notification()
            .withf(|_, status, error| *status == NotificationStatus::Sent && error.is_none())
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut notifier = MockStatusNotifier::new();
        notifier
            .expect_notify()
            .withf(|n| n.order_number == 1 && n.status == OrderStatus::Received && n.phone == "5511987654321")
            .times(1)
            .returning(|_| Ok(()));

        let result = service(orders, clients, stores, Some(notifier))
            .create(
                &actor,
                CreateServiceOrder {
                    client_id: client.id,
                    items: items(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(result.order.number, 1);
        assert_eq!(result.change.notification, NotificationStatus::Sent);
    }

    #[tokio::test]
    async fn test_create_rejects_client_from_other_store() {
        let store_a = store(Uuid::new_v4());
        let store_b = store(store_a.company_id);
        let foreign = client(&store_b);
        let (stores, clients) = lookups(&store_a, &foreign);
        let mut orders = MockServiceOrderRepository::new();
        orders.expect_create().never();

        let err = service(orders, clients, stores, None)
            .create(
                &company_admin(store_a.company_id),
                CreateServiceOrder {
                    store_id: Some(store_a.id),
                    client_id: foreign.id,
                    items: items(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_change_status_without_notifier_is_skipped() {
        let store = store(Uuid::new_v4());
        let client = client(&store);
        let actor = store_actor(Role::Employee, &store);
        let order = order_for(&client, &actor);
        let id = order.id;

        let mut orders = MockServiceOrderRepository::new();
        orders.expect_find_by_id().returning(move |_| Ok(Some(order.clone())));
        orders
            .expect_update_status()
            .withf(|o, c| o.status == OrderStatus::InProgress && c.from_status == Some(OrderStatus::Received))
            .returning(|o, _| Ok(o.clone()));
        orders
            .expect_record_notification()
            .withf(|_, status, _| *status == NotificationStatus::Skipped)
            .returning(|_, _, _| Ok(()));

        let result = service(orders, MockClientRepository::new(), MockStoreRepository::new(), None)
            .change_status(
                &actor,
                &id,
                ChangeStatus {
                    status: OrderStatus::InProgress,
                    note: Some("Bancada 2".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(result.order.status, OrderStatus::InProgress);
        assert!(result.order.started_at.is_some());
        assert_eq!(result.change.note.as_deref(), Some("Bancada 2"));
        assert_eq!(result.change.notification, NotificationStatus::Skipped);
    }

    #[tokio::test]
    async fn test_gateway_failure_does_not_fail_status_change() {
        let store = store(Uuid::new_v4());
        let client = client(&store);
        let actor = store_actor(Role::Employee, &store);
        let order = order_for(&client, &actor);
        let id = order.id;
        let (stores, clients) = lookups(&store, &client);

        let mut orders = MockServiceOrderRepository::new();
        orders.expect_find_by_id().returning(move |_| Ok(Some(order.clone())));
        orders.expect_update_status().returning(|o, _| Ok(o.clone()));
        orders
            .expect_record_notification()
            .withf(|_, status, error| *status == NotificationStatus::Failed && error.is_some())
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut notifier = MockStatusNotifier::new();
        notifier.expect_notify().returning(|_| {
            Err(NotificationError::Rejected {
                status: 400,
                body: "invalid phone".to_string(),
            })
        });

        let result = service(orders, clients, stores, Some(notifier))
            .change_status(
                &actor,
                &id,
                ChangeStatus {
                    status: OrderStatus::InProgress,
                    note: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(result.order.status, OrderStatus::InProgress);
        assert_eq!(result.change.notification, NotificationStatus::Failed);
        assert!(result.change.notification_error.unwrap().contains("invalid phone"));
    }

    #[tokio::test]
    async fn test_invalid_transition_is_rejected() {
        let store = store(Uuid::new_v4());
        let client = client(&store);
        let actor = store_actor(Role::Manager, &store);
        let order = order_for(&client, &actor);
        let id = order.id;

        let mut orders = MockServiceOrderRepository::new();
        orders.expect_find_by_id().returning(move |_| Ok(Some(order.clone())));
        orders.expect_update_status().never();

        let err = service(orders, MockClientRepository::new(), MockStoreRepository::new(), None)
            .change_status(
                &actor,
                &id,
                ChangeStatus {
                    status: OrderStatus::Finished,
                    note: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidStatusTransition {
                from: OrderStatus::Received,
                to: OrderStatus::Finished
            }
        ));
    }

    #[tokio::test]
    async fn test_employee_cannot_mark_paid() {
        let store = store(Uuid::new_v4());
        let client = client(&store);
        let actor = store_actor(Role::Employee, &store);
        let mut order = order_for(&client, &actor);
        order.status = OrderStatus::Finished;
        let id = order.id;

        let mut orders = MockServiceOrderRepository::new();
        orders.expect_find_by_id().returning(move |_| Ok(Some(order.clone())));
        orders.expect_update_status().never();

        let err = service(orders, MockClientRepository::new(), MockStoreRepository::new(), None)
            .change_status(
                &actor,
                &id,
                ChangeStatus {
                    status: OrderStatus::Paid,
                    note: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_finished_order_cannot_be_edited() {
        let store = store(Uuid::new_v4());
        let client = client(&store);
        let actor = store_actor(Role::Employee, &store);
        let mut order = order_for(&client, &actor);
        order.status = OrderStatus::Finished;
        let id = order.id;

        let mut orders = MockServiceOrderRepository::new();
        orders.expect_find_by_id().returning(move |_| Ok(Some(order.clone())));
        orders.expect_update().never();

        let err = service(orders, MockClientRepository::new(), MockStoreRepository::new(), None)
            .update(
                &actor,
                &id,
                UpdateServiceOrder {
                    items: Some(items()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::OrderNotEditable(OrderStatus::Finished)));
    }

    #[tokio::test]
    async fn test_paid_order_cannot_be_deleted() {
        let store = store(Uuid::new_v4());
        let client = client(&store);
        let actor = store_actor(Role::Manager, &store);
        let mut order = order_for(&client, &actor);
        order.status = OrderStatus::Paid;
        let id = order.id;

        let mut orders = MockServiceOrderRepository::new();
        orders.expect_find_by_id().returning(move |_| Ok(Some(order.clone())));
        orders.expect_soft_delete().never();

        let err = service(orders, MockClientRepository::new(), MockStoreRepository::new(), None)
            .delete(&actor, &id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::OrderNotEditable(OrderStatus::Paid)));
    }

    #[tokio::test]
    async fn test_order_in_other_company_is_not_found() {
        let store = store(Uuid::new_v4());
        let client = client(&store);
        let owner = store_actor(Role::Manager, &store);
        let order = order_for(&client, &owner);
        let id = order.id;

        let mut orders = MockServiceOrderRepository::new();
        orders.expect_find_by_id().returning(move |_| Ok(Some(order.clone())));
        orders.expect_history().never();

        let err = service(orders, MockClientRepository::new(), MockStoreRepository::new(), None)
            .history(&company_admin(Uuid::new_v4()), &id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ServiceOrderNotFound));
    }
}
