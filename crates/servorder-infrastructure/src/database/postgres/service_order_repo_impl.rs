// ============================================================================
// Servorder Infrastructure - PostgreSQL Service Order Repository
// File: crates/servorder-infrastructure/src/database/postgres/service_order_repo_impl.rs
// Description: Orders, their items and the status history table
// ============================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{debug, info};
use uuid::Uuid;

use servorder_core::access::TenantScope;
use servorder_core::domain::{NotificationStatus, OrderStatus, ServiceItem, ServiceOrder, StatusChange};
use servorder_core::error::DomainError;
use servorder_core::repositories::{ServiceOrderFilter, ServiceOrderRepository, StatusTotals};
use servorder_shared::{Page, Pagination};

use super::db_error;

pub struct PgServiceOrderRepository {
    pool: PgPool,
}

impl PgServiceOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explains why a status-guarded write matched no row.
    async fn rejected_write(&self, id: &Uuid) -> DomainError {
        let status: Result<Option<String>, sqlx::Error> =
            sqlx::query_scalar("SELECT status FROM service_orders WHERE id = $1 AND removed_at IS NULL")
                .bind(id)
                .fetch_optional(&self.pool)
                .await;
        match status {
            Ok(Some(status)) => {
                debug!("Order {} is {} and was not written", id, status);
                DomainError::OrderNotEditable(parse_status(&status))
            }
            Ok(None) => DomainError::ServiceOrderNotFound,
            Err(e) => db_error("reading service order status", e),
        }
    }

    async fn load_items(&self, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<ServiceItem>>, DomainError> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, description, quantity, unit_price_cents
            FROM service_order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("loading service order items", e))?;

        let mut items: HashMap<Uuid, Vec<ServiceItem>> = HashMap::new();
        for row in rows {
            items.entry(row.order_id).or_default().push(row.into());
        }
        Ok(items)
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub store_id: Uuid,
    pub client_id: Uuid,
    pub number: i64,
    pub description: Option<String>,
    pub status: String,
    pub total_cents: i64,
    pub started_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl OrderRow {
    fn into_order(self, items: Vec<ServiceItem>) -> ServiceOrder {
        ServiceOrder {
            id: self.id,
            company_id: self.company_id,
            store_id: self.store_id,
            client_id: self.client_id,
            number: self.number,
            description: self.description,
            status: parse_status(&self.status),
            items,
            total_cents: self.total_cents,
            started_at: self.started_at,
            paused_at: self.paused_at,
            finished_at: self.finished_at,
            paid_at: self.paid_at,
            created_at: self.created_at,
            created_by: self.created_by,
            modified_at: self.modified_at,
            modified_by: self.modified_by,
            removed_at: self.removed_at,
            removed_by: self.removed_by,
        }
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub description: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

impl From<ItemRow> for ServiceItem {
    fn from(row: ItemRow) -> Self {
        ServiceItem {
            id: row.id,
            description: row.description,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
        }
    }
}

#[derive(Debug, FromRow)]
struct HistoryRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub from_status: Option<String>,
    pub to_status: String,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
    pub note: Option<String>,
    pub notification: String,
    pub notification_error: Option<String>,
}

impl From<HistoryRow> for StatusChange {
    fn from(row: HistoryRow) -> Self {
        StatusChange {
            id: row.id,
            order_id: row.order_id,
            from_status: row.from_status.as_deref().map(parse_status),
            to_status: parse_status(&row.to_status),
            changed_by: row.changed_by,
            changed_at: row.changed_at,
            note: row.note,
            notification: NotificationStatus::from_str(&row.notification).unwrap_or_default(),
            notification_error: row.notification_error,
        }
    }
}

#[derive(Debug, FromRow)]
struct TotalsRow {
    pub status: String,
    pub count: i64,
    pub total_cents: i64,
}

const EDITABLE_STATUSES: &str = "'RECEIVED', 'IN_PROGRESS', 'PAUSED'";

// Guarded by the status CHECK constraint
fn parse_status(s: &str) -> OrderStatus {
    OrderStatus::from_str(s).unwrap_or(OrderStatus::Received)
}

const COLUMNS: &str = "id, company_id, store_id, client_id, number, description, status, total_cents, \
     started_at, paused_at, finished_at, paid_at, \
     created_at, created_by, modified_at, modified_by, removed_at, removed_by";

async fn insert_items(conn: &mut PgConnection, order: &ServiceOrder) -> Result<(), DomainError> {
    for (position, item) in order.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO service_order_items (id, order_id, position, description, quantity, unit_price_cents)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.id)
        .bind(order.id)
        .bind(position as i32)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .execute(&mut *conn)
        .await
        .map_err(|e| db_error("inserting service order item", e))?;
    }
    Ok(())
}

async fn insert_history(conn: &mut PgConnection, change: &StatusChange) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO service_order_status_history (
            id, order_id, from_status, to_status, changed_by, changed_at,
            note, notification, notification_error
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(change.id)
    .bind(change.order_id)
    .bind(change.from_status.map(|s| s.as_str()))
    .bind(change.to_status.as_str())
    .bind(change.changed_by)
    .bind(change.changed_at)
    .bind(&change.note)
    .bind(change.notification.as_str())
    .bind(&change.notification_error)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_error("inserting status history", e))?;
    Ok(())
}

#[async_trait]
impl ServiceOrderRepository for PgServiceOrderRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<ServiceOrder>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM service_orders WHERE id = $1 AND removed_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding service order by id", e))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut items = self.load_items(&[row.id]).await?;
        let order_items = items.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_order(order_items)))
    }

    async fn list(
        &self,
        filter: &ServiceOrderFilter,
        pagination: Pagination,
    ) -> Result<Page<ServiceOrder>, DomainError> {
        let status = filter.status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM service_orders
            WHERE removed_at IS NULL
              AND ($1::uuid IS NULL OR company_id = $1)
              AND ($2::uuid IS NULL OR store_id = $2)
              AND ($3::uuid IS NULL OR client_id = $3)
              AND ($4::text IS NULL OR status = $4)
            "#,
        )
        .bind(filter.scope.company_id)
        .bind(filter.scope.store_id)
        .bind(filter.client_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("counting service orders", e))?;

        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COLUMNS} FROM service_orders
            WHERE removed_at IS NULL
              AND ($1::uuid IS NULL OR company_id = $1)
              AND ($2::uuid IS NULL OR store_id = $2)
              AND ($3::uuid IS NULL OR client_id = $3)
              AND ($4::text IS NULL OR status = $4)
            ORDER BY created_at DESC, number DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(filter.scope.company_id)
        .bind(filter.scope.store_id)
        .bind(filter.client_id)
        .bind(status)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing service orders", e))?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut items = self.load_items(&ids).await?;
        let orders = rows
            .into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect();

        Ok(Page::new(orders, total, pagination))
    }

    async fn create(&self, order: &ServiceOrder, initial: &StatusChange) -> Result<ServiceOrder, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("starting order transaction", e))?;

        // Row lock on the store serializes concurrent creations
        let number: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE stores
            SET next_order_number = next_order_number + 1
            WHERE id = $1 AND removed_at IS NULL
            RETURNING next_order_number - 1
            "#,
        )
        .bind(order.store_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("taking order number", e))?;
        let number = number.ok_or(DomainError::StoreNotFound)?;

        sqlx::query(
            r#"
            INSERT INTO service_orders (
                id, company_id, store_id, client_id, number, description, status, total_cents,
                started_at, paused_at, finished_at, paid_at,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(order.id)
        .bind(order.company_id)
        .bind(order.store_id)
        .bind(order.client_id)
        .bind(number)
        .bind(&order.description)
        .bind(order.status.as_str())
        .bind(order.total_cents)
        .bind(order.started_at)
        .bind(order.paused_at)
        .bind(order.finished_at)
        .bind(order.paid_at)
        .bind(order.created_at)
        .bind(order.created_by)
        .bind(order.modified_at)
        .bind(order.modified_by)
        .bind(order.removed_at)
        .bind(order.removed_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("creating service order", e))?;

        insert_items(&mut *tx, order).await?;
        insert_history(&mut *tx, initial).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("committing order transaction", e))?;

        info!("Service order {} stored as #{} in store {}", order.id, number, order.store_id);
        let mut stored = order.clone();
        stored.number = number;
        Ok(stored)
    }

    async fn update(&self, order: &ServiceOrder) -> Result<ServiceOrder, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("starting order transaction", e))?;

        // Only applies while the stored order is still editable
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"
            UPDATE service_orders
            SET
                description = $2,
                total_cents = $3,
                modified_at = $4,
                modified_by = $5
            WHERE id = $1 AND removed_at IS NULL AND status IN ({EDITABLE_STATUSES})
            RETURNING {COLUMNS}
            "#
        ))
        .bind(order.id)
        .bind(&order.description)
        .bind(order.total_cents)
        .bind(order.modified_at)
        .bind(order.modified_by)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("updating service order", e))?;

        let Some(row) = row else {
            return Err(self.rejected_write(&order.id).await);
        };

        sqlx::query("DELETE FROM service_order_items WHERE order_id = $1")
            .bind(order.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("clearing service order items", e))?;
        insert_items(&mut *tx, order).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("committing order transaction", e))?;

        Ok(row.into_order(order.items.clone()))
    }

    async fn soft_delete(&self, order: &ServiceOrder) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE service_orders
            SET removed_at = $2, removed_by = $3
            WHERE id = $1 AND removed_at IS NULL AND status <> 'PAID'
            "#,
        )
        .bind(order.id)
        .bind(order.removed_at)
        .bind(order.removed_by)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("deleting service order", e))?;

        if result.rows_affected() == 0 {
            return Err(self.rejected_write(&order.id).await);
        }
        Ok(())
    }

    async fn update_status(&self, order: &ServiceOrder, change: &StatusChange) -> Result<ServiceOrder, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("starting status transaction", e))?;

        // Only applies when nobody moved the order since it was read
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"
            UPDATE service_orders
            SET
                status = $2,
                started_at = $3,
                paused_at = $4,
                finished_at = $5,
                paid_at = $6,
                modified_at = $7,
                modified_by = $8
            WHERE id = $1 AND removed_at IS NULL AND status = $9
            RETURNING {COLUMNS}
            "#
        ))
        .bind(order.id)
        .bind(order.status.as_str())
        .bind(order.started_at)
        .bind(order.paused_at)
        .bind(order.finished_at)
        .bind(order.paid_at)
        .bind(order.modified_at)
        .bind(order.modified_by)
        .bind(change.from_status.map(|s| s.as_str()))
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("updating service order status", e))?;

        let Some(row) = row else {
            debug!("Status of order {} changed concurrently", order.id);
            return Err(DomainError::InvalidStatusTransition {
                from: change.from_status.unwrap_or(OrderStatus::Received),
                to: change.to_status,
            });
        };

        insert_history(&mut *tx, change).await?;
        tx.commit()
            .await
            .map_err(|e| db_error("committing status transaction", e))?;

        Ok(row.into_order(order.items.clone()))
    }

    async fn record_notification(
        &self,
        change_id: &Uuid,
        status: NotificationStatus,
        error: Option<String>,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE service_order_status_history
            SET notification = $2, notification_error = $3
            WHERE id = $1
            "#,
        )
        .bind(change_id)
        .bind(status.as_str())
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("recording notification outcome", e))?;

        Ok(())
    }

    async fn history(&self, order_id: &Uuid) -> Result<Vec<StatusChange>, DomainError> {
        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, from_status, to_status, changed_by, changed_at,
                   note, notification, notification_error
            FROM service_order_status_history
            WHERE order_id = $1
            ORDER BY changed_at ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("loading status history", e))?;

        Ok(rows.into_iter().map(StatusChange::from).collect())
    }

    async fn status_totals(&self, scope: &TenantScope) -> Result<Vec<StatusTotals>, DomainError> {
        let rows: Vec<TotalsRow> = sqlx::query_as(
            r#"
            SELECT status,
                   COUNT(*)::BIGINT AS count,
                   COALESCE(SUM(total_cents), 0)::BIGINT AS total_cents
            FROM service_orders
            WHERE removed_at IS NULL
              AND ($1::uuid IS NULL OR company_id = $1)
              AND ($2::uuid IS NULL OR store_id = $2)
            GROUP BY status
            "#,
        )
        .bind(scope.company_id)
        .bind(scope.store_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("aggregating service orders", e))?;

        Ok(rows
            .into_iter()
            .map(|row| StatusTotals {
                status: parse_status(&row.status),
                count: row.count,
                total_cents: row.total_cents,
            })
            .collect())
    }
}
