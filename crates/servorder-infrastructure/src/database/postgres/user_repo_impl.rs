// ============================================================================
// Servorder Infrastructure - PostgreSQL User Repository
// File: crates/servorder-infrastructure/src/database/postgres/user_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use servorder_core::domain::{Role, User};
use servorder_core::error::DomainError;
use servorder_core::repositories::{UserFilter, UserRepository};
use servorder_shared::utils::mask_email;
use servorder_shared::{Page, Pagination};

use super::{db_error, is_unique_violation, like_pattern};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct UserRow {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Uuid>,
    pub removed_at: Option<DateTime<Utc>>,
    pub removed_by: Option<Uuid>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            company_id: row.company_id,
            store_id: row.store_id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: Role::from_str(&row.role).unwrap_or_default(),
            is_active: row.is_active,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            created_by: row.created_by,
            modified_at: row.modified_at,
            modified_by: row.modified_by,
            removed_at: row.removed_at,
            removed_by: row.removed_by,
        }
    }
}

const COLUMNS: &str = "id, company_id, store_id, name, email, password_hash, role, is_active, last_login_at, \
     created_at, created_by, modified_at, modified_by, removed_at, removed_by";

fn conflict_or_db(context: &str, user: &User, e: sqlx::Error) -> DomainError {
    if is_unique_violation(&e) {
        warn!("Duplicate user email: {}", mask_email(&user.email));
        DomainError::EmailAlreadyExists(user.email.clone())
    } else {
        db_error(context, e)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM users WHERE id = $1 AND removed_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding user by id", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) AND removed_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("finding user by email", e))?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(&self, filter: &UserFilter, pagination: Pagination) -> Result<Page<User>, DomainError> {
        let pattern = like_pattern(&filter.search);
        let role = filter.role.map(|r| r.as_str());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users
            WHERE removed_at IS NULL
              AND ($1::uuid IS NULL OR company_id = $1)
              AND ($2::uuid IS NULL OR store_id = $2)
              AND ($3::text IS NULL OR role = $3)
              AND ($4::text IS NULL OR name ILIKE $4 OR email ILIKE $4)
            "#,
        )
        .bind(filter.scope.company_id)
        .bind(filter.scope.store_id)
        .bind(role)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("counting users", e))?;

        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COLUMNS} FROM users
            WHERE removed_at IS NULL
              AND ($1::uuid IS NULL OR company_id = $1)
              AND ($2::uuid IS NULL OR store_id = $2)
              AND ($3::text IS NULL OR role = $3)
              AND ($4::text IS NULL OR name ILIKE $4 OR email ILIKE $4)
            ORDER BY name ASC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(filter.scope.company_id)
        .bind(filter.scope.store_id)
        .bind(role)
        .bind(&pattern)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("listing users", e))?;

        Ok(Page::new(rows.into_iter().map(User::from).collect(), total, pagination))
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        info!("Creating user with email: {}", mask_email(&user.email));

        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (
                id, company_id, store_id, name, email, password_hash, role, is_active, last_login_at,
                created_at, created_by, modified_at, modified_by, removed_at, removed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(user.company_id)
        .bind(user.store_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.created_by)
        .bind(user.modified_at)
        .bind(user.modified_by)
        .bind(user.removed_at)
        .bind(user.removed_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_db("creating user", user, e))?;

        info!("User created successfully: {}", row.id);
        Ok(row.into())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r#"
            UPDATE users
            SET
                company_id = $2,
                store_id = $3,
                name = $4,
                email = $5,
                password_hash = $6,
                role = $7,
                is_active = $8,
                last_login_at = $9,
                modified_at = $10,
                modified_by = $11,
                removed_at = $12,
                removed_by = $13
            WHERE id = $1 AND removed_at IS NULL
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(user.company_id)
        .bind(user.store_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.last_login_at)
        .bind(user.modified_at)
        .bind(user.modified_by)
        .bind(user.removed_at)
        .bind(user.removed_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_or_db("updating user", user, e))?;

        row.map(User::from).ok_or(DomainError::UserNotFound)
    }
}
