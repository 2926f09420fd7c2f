// ============================================================================
// Servorder Infrastructure - PostgreSQL Store Repository
// File: crates/servorder-infrastructure/src/database/postgres/store_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use servorder_core::domain::Store;
use servorder_core::error::DomainError;
use servorder_core::repositories::{StoreFilter, StoreRepository};
use servorder_shared::{Page, Pagination};

use super::{db_error, like_pattern};

pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StoreRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub next_order_number: i64,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Store {
            id: row.id,
            company_id: row.company_id,
            name: row.name,
            address: row.address,
            phone: row.phone,
            is_active: row.is_active,
            next_order_number: row.next_order_number,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
            removed_at: row.removed_at,
            removed_by: row.removed_by,
        }
    }
}

const COLUMNS: &str = "id, company_id, name, address, phone, is_active, next_order_number, \
     created_at, created_by, modified_at, modified_by, removed_at, removed_by";

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Store>, DomainError> {
        let row: Option<StoreRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM stores WHERE id = $1 AND removed_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding store by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, filter: &StoreFilter, pagination: Pagination) -> Result<Page<Store>, DomainError> {
        let pattern = like_pattern(&filter.search);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM stores
            WHERE removed_at IS NULL
              AND ($1::uuid IS NULL OR company_id = $1)
              AND ($2::uuid IS NULL OR id = $2)
              AND ($3::text IS NULL OR name ILIKE $3)
            "#,
        )
        .bind(filter.scope.company_id)
        .bind(filter.scope.store_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("counting stores", e))?;

        let rows: Vec<StoreRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COLUMNS} FROM stores
            WHERE removed_at IS NULL
              AND ($1::uuid IS NULL OR company_id = $1)
              AND ($2::uuid IS NULL OR id = $2)
              AND ($3::text IS NULL OR name ILIKE $3)
            ORDER BY name ASC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filter.scope.company_id)
        .bind(filter.scope.store_id)
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing stores", e))?;

        Ok(Page::new(rows.into_iter().map(Store::from).collect(), total, pagination))
    }

    async fn create(&self, store: &Store) -> Result<Store, DomainError> {
        info!("Creating store {} for company {}", store.name, store.company_id);

        let row: StoreRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO stores (
                id, company_id, name, address, phone, is_active, next_order_number,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(store.id)
        .bind(store.company_id)
        .bind(&store.name)
        .bind(&store.address)
        .bind(&store.phone)
        .bind(store.is_active)
        .bind(store.next_order_number)
        .bind(store.created_at)
        .bind(store.created_by)
        .bind(store.modified_at)
        .bind(store.modified_by)
        .bind(store.removed_at)
        .bind(store.removed_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("creating store", e))?;

        Ok(row.into())
    }

    async fn update(&self, store: &Store) -> Result<Store, DomainError> {
        let row: Option<StoreRow> = sqlx::query_as(&format!(
            r#"
            UPDATE stores
            SET
                name = $2,
                address = $3,
                phone = $4,
                is_active = $5,
                modified_at = $6,
                modified_by = $7,
                removed_at = $8,
                removed_by = $9
            WHERE id = $1 AND removed_at IS NULL
            RETURNING {COLUMNS}
            "#
        ))
        .bind(store.id)
        .bind(&store.name)
        .bind(&store.address)
        .bind(&store.phone)
        .bind(store.is_active)
        .bind(store.modified_at)
        .bind(store.modified_by)
        .bind(store.removed_at)
        .bind(store.removed_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating store", e))?;

        row.map(Store::from).ok_or(DomainError::StoreNotFound)
    }
}
