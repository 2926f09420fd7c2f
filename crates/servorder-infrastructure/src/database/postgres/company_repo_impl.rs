// ============================================================================
// Servorder Infrastructure - PostgreSQL Company Repository
// File: crates/servorder-infrastructure/src/database/postgres/company_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use servorder_core::domain::Company;
use servorder_core::error::DomainError;
use servorder_core::repositories::{CompanyFilter, CompanyRepository};
use servorder_shared::{Page, Pagination};

use super::{db_error, is_unique_violation, like_pattern};

pub struct PgCompanyRepository {
    pool: PgPool,
}

impl PgCompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub document: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            id: row.id,
            name: row.name,
            document: row.document,
            phone: row.phone,
            email: row.email,
            is_active: row.is_active,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
            removed_at: row.removed_at,
            removed_by: row.removed_by,
        }
    }
}

const COLUMNS: &str = "id, name, document, phone, email, is_active, \
     created_at, created_by, modified_at, modified_by, removed_at, removed_by";

fn conflict_or_db(context: &str, company: &Company, e: sqlx::Error) -> DomainError {
    if is_unique_violation(&e) {
        error!("Duplicate company document: {:?}", company.document);
        DomainError::CompanyDocumentAlreadyExists(company.document.clone().unwrap_or_default())
    } else {
        db_error(context, e)
    }
}

#[async_trait]
impl CompanyRepository for PgCompanyRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Company>, DomainError> {
        let row: Option<CompanyRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM companies WHERE id = $1 AND removed_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding company by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_document(&self, document: &str) -> Result<Option<Company>, DomainError> {
        let row: Option<CompanyRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM companies WHERE document = $1 AND removed_at IS NULL"
        ))
        .bind(document)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding company by document", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, filter: &CompanyFilter, pagination: Pagination) -> Result<Page<Company>, DomainError> {
        let pattern = like_pattern(&filter.search);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM companies
            WHERE removed_at IS NULL
              AND ($1::uuid IS NULL OR id = $1)
              AND ($2::text IS NULL OR name ILIKE $2 OR document ILIKE $2)
            "#,
        )
        .bind(filter.company_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("counting companies", e))?;

        let rows: Vec<CompanyRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COLUMNS} FROM companies
            WHERE removed_at IS NULL
              AND ($1::uuid IS NULL OR id = $1)
              AND ($2::text IS NULL OR name ILIKE $2 OR document ILIKE $2)
            ORDER BY name ASC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(filter.company_id)
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing companies", e))?;

        Ok(Page::new(rows.into_iter().map(Company::from).collect(), total, pagination))
    }

    async fn create(&self, company: &Company) -> Result<Company, DomainError> {
        info!("Creating company: {}", company.name);

        let row: CompanyRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO companies (
                id, name, document, phone, email, is_active,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.document)
        .bind(&company.phone)
        .bind(&company.email)
        .bind(company.is_active)
        .bind(company.created_at)
        .bind(company.created_by)
        .bind(company.modified_at)
        .bind(company.modified_by)
        .bind(company.removed_at)
        .bind(company.removed_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_db("creating company", company, e))?;

        Ok(row.into())
    }

    async fn update(&self, company: &Company) -> Result<Company, DomainError> {
        let row: Option<CompanyRow> = sqlx::query_as(&format!(
            r#"
            UPDATE companies
            SET
                name = $2,
                document = $3,
                phone = $4,
                email = $5,
                is_active = $6,
                modified_at = $7,
                modified_by = $8,
                removed_at = $9,
                removed_by = $10
            WHERE id = $1 AND removed_at IS NULL
            RETURNING {COLUMNS}
            "#
        ))
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.document)
        .bind(&company.phone)
        .bind(&company.email)
        .bind(company.is_active)
        .bind(company.modified_at)
        .bind(company.modified_by)
        .bind(company.removed_at)
        .bind(company.removed_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_or_db("updating company", company, e))?;

        row.map(Company::from).ok_or(DomainError::CompanyNotFound)
    }
}
