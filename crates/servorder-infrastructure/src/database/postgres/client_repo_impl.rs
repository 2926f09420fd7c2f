// ============================================================================
// Servorder Infrastructure - PostgreSQL Client Repository
// File: crates/servorder-infrastructure/src/database/postgres/client_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use servorder_core::domain::Client;
use servorder_core::error::DomainError;
use servorder_core::repositories::{ClientFilter, ClientRepository};
use servorder_shared::{Page, Pagination};

use super::{db_error, like_pattern};

pub struct PgClientRepository {
    pool: PgPool,
}

impl PgClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ClientRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub document: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            company_id: row.company_id,
            store_id: row.store_id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            document: row.document,
            notes: row.notes,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
            removed_at: row.removed_at,
            removed_by: row.removed_by,
        }
    }
}

const COLUMNS: &str = "id, company_id, store_id, name, phone, email, document, notes, \
     created_at, created_by, modified_at, modified_by, removed_at, removed_by";

#[async_trait]
impl ClientRepository for PgClientRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Client>, DomainError> {
        let row: Option<ClientRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM clients WHERE id = $1 AND removed_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding client by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, filter: &ClientFilter, pagination: Pagination) -> Result<Page<Client>, DomainError> {
        let pattern = like_pattern(&filter.search);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM clients
            WHERE removed_at IS NULL
              AND ($1::uuid IS NULL OR company_id = $1)
              AND ($2::uuid IS NULL OR store_id = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR phone LIKE $3)
            "#,
        )
        .bind(filter.scope.company_id)
        .bind(filter.scope.store_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("counting clients", e))?;

        let rows: Vec<ClientRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COLUMNS} FROM clients
            WHERE removed_at IS NULL
              AND ($1::uuid IS NULL OR company_id = $1)
              AND ($2::uuid IS NULL OR store_id = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR phone LIKE $3)
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
        .map_err(|e| db_error("listing clients", e))?;

        Ok(Page::new(rows.into_iter().map(Client::from).collect(), total, pagination))
    }

    async fn create(&self, client: &Client) -> Result<Client, DomainError> {
        let row: ClientRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO clients (
                id, company_id, store_id, name, phone, email, document, notes,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(client.id)
        .bind(client.company_id)
        .bind(client.store_id)
        .bind(&client.name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.document)
        .bind(&client.notes)
        .bind(client.created_at)
        .bind(client.created_by)
        .bind(client.modified_at)
        .bind(client.modified_by)
        .bind(client.removed_at)
        .bind(client.removed_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("creating client", e))?;

        Ok(row.into())
    }

    async fn update(&self, client: &Client) -> Result<Client, DomainError> {
        let row: Option<ClientRow> = sqlx::query_as(&format!(
            r#"
            UPDATE clients
            SET
                name = $2,
                phone = $3,
                email = $4,
                document = $5,
                notes = $6,
                modified_at = $7,
                modified_by = $8,
                removed_at = $9,
                removed_by = $10
            WHERE id = $1 AND removed_at IS NULL
            RETURNING {COLUMNS}
            "#
        ))
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.phone)
        .bind(&client.email)
        .bind(&client.document)
        .bind(&client.notes)
        .bind(client.modified_at)
        .bind(client.modified_by)
        .bind(client.removed_at)
        .bind(client.removed_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("updating client", e))?;

        row.map(Client::from).ok_or(DomainError::ClientNotFound)
    }
}
