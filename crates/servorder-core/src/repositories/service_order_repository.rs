//! Service order repository trait (port)

use async_trait::async_trait;
use serde::Serialize;
use servorder_shared::{Page, Pagination};
use uuid::Uuid;

use crate::access::TenantScope;
use crate::domain::{NotificationStatus, OrderStatus, ServiceOrder, StatusChange};
use crate::error::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceOrderFilter {
    pub scope: TenantScope,
    pub client_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
}

/// Aggregate for one status within a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusTotals {
    pub status: OrderStatus,
    pub count: i64,
    pub total_cents: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceOrderRepository: Send + Sync {
    /// Loads the order with its items.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ServiceOrder>, DomainError>;

    /// Newest first, items included.
    async fn list(&self, filter: &ServiceOrderFilter, pagination: Pagination) -> Result<Page<ServiceOrder>, DomainError>;

    /// Atomically takes the store's next order number, inserts the order with
    /// its items and writes the initial history entry. Returns the stored order.
    async fn create(&self, order: &ServiceOrder, initial: &StatusChange) -> Result<ServiceOrder, DomainError>;

    /// Updates description and total and replaces the items. Fails with
    /// `OrderNotEditable` when the stored order has left the editable statuses.
    async fn update(&self, order: &ServiceOrder) -> Result<ServiceOrder, DomainError>;

    /// Stamps `removed_at`/`removed_by` unless the stored order is PAID.
    async fn soft_delete(&self, order: &ServiceOrder) -> Result<(), DomainError>;

    /// Writes the new status and timestamps together with the history entry.
    async fn update_status(&self, order: &ServiceOrder, change: &StatusChange) -> Result<ServiceOrder, DomainError>;

    async fn record_notification(
        &self,
        change_id: &Uuid,
        status: NotificationStatus,
        error: Option<String>,
    ) -> Result<(), DomainError>;

    /// Oldest first.
    async fn history(&self, order_id: &Uuid) -> Result<Vec<StatusChange>, DomainError>;

    /// One entry per status that has at least one order.
    async fn status_totals(&self, scope: &TenantScope) -> Result<Vec<StatusTotals>, DomainError>;
}
