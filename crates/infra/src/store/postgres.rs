//! Postgres-backed store implementations.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | duplicate email |
//! | Database (foreign key violation) | `23503` | `Backend` | confirmation for a deleted user |
//! | Database (other) | any other | `Backend` | check constraints, etc. |
//! | PoolClosed / network / decode | N/A | `Backend` | |
//!
//! ## Thread Safety
//!
//! All stores share one SQLx connection pool, which is `Send + Sync`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use delivery_auth::{Role, User};
use delivery_catalog::{CatalogItem, CatalogItemPatch};
use delivery_confirmations::{Confirmation, ConfirmationStatus};
use delivery_core::{CatalogItemId, ConfirmationId, Email, UserId};

use super::r#trait::{CatalogStore, ConfirmationStore, StoreError, UserStore};

/// Schema applied by [`apply_schema`]. Idempotent.
pub const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Open a connection pool.
pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Create tables and indexes if they do not exist yet.
pub async fn apply_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("apply_schema", e))?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// Postgres-backed credential store (`delivery_users`).
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip_all, fields(user_id = %user.id), err)]
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO delivery_users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| match map_sqlx_error("insert_user", e) {
            StoreError::Conflict(_) => {
                StoreError::Conflict(format!("email {} is already registered", user.email))
            }
            other => other,
        })?;

        Ok(user)
    }

    #[instrument(skip_all, err)]
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM delivery_users WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM delivery_users WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_id", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip_all, fields(count = ids.len()), err)]
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM delivery_users WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_users", e))?;

        rows.iter().map(user_from_row).collect()
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let email: String = row.try_get("email").map_err(decode_error)?;
    let role: String = row.try_get("role").map_err(decode_error)?;

    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(decode_error)?),
        name: row.try_get("name").map_err(decode_error)?,
        email: Email::parse(&email).map_err(|e| StoreError::Backend(format!("stored email: {e}")))?,
        password_hash: row.try_get("password_hash").map_err(decode_error)?,
        role: role
            .parse::<Role>()
            .map_err(|e| StoreError::Backend(format!("stored role: {e}")))?,
        created_at: row.try_get("created_at").map_err(decode_error)?,
        updated_at: row.try_get("updated_at").map_err(decode_error)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// Postgres-backed catalog store (`delivery_items`).
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

const ITEM_COLUMNS: &str = "id, name, description, eta_minutes, active, created_at, updated_at";

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip_all, fields(item_id = %item.id), err)]
    async fn insert(&self, item: CatalogItem) -> Result<CatalogItem, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO delivery_items (id, name, description, eta_minutes, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(item.id.as_uuid())
        .bind(&item.name)
        .bind(&item.description)
        .bind(eta_to_db(item.eta_minutes)?)
        .bind(item.active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_item", e))?;

        Ok(item)
    }

    #[instrument(skip(self), err)]
    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM delivery_items")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_items", e))?;
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self), err)]
    async fn list_active(&self) -> Result<Vec<CatalogItem>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"SELECT {ITEM_COLUMNS} FROM delivery_items
               WHERE active
               ORDER BY name COLLATE "C" ASC, id ASC"#
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_active_items", e))?;

        rows.iter().map(item_from_row).collect()
    }

    #[instrument(skip(self), err)]
    async fn list_all(&self) -> Result<Vec<CatalogItem>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM delivery_items ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_items", e))?;

        rows.iter().map(item_from_row).collect()
    }

    #[instrument(skip(self, patch), err)]
    async fn update(
        &self,
        id: CatalogItemId,
        patch: &CatalogItemPatch,
        occurred_at: DateTime<Utc>,
    ) -> Result<CatalogItem, StoreError> {
        let eta = patch.eta_minutes.map(eta_to_db).transpose()?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE delivery_items SET
                name        = COALESCE($2, name),
                description = COALESCE($3, description),
                eta_minutes = COALESCE($4, eta_minutes),
                active      = COALESCE($5, active),
                updated_at  = $6
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(eta)
        .bind(patch.active)
        .bind(occurred_at)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_item", e))?;

        match row {
            Some(row) => item_from_row(&row),
            None => Err(StoreError::NotFound("delivery item")),
        }
    }
}

fn eta_to_db(eta: u32) -> Result<i32, StoreError> {
    i32::try_from(eta).map_err(|_| StoreError::Backend(format!("eta_minutes {eta} out of range")))
}

fn item_from_row(row: &PgRow) -> Result<CatalogItem, StoreError> {
    let eta: i32 = row.try_get("eta_minutes").map_err(decode_error)?;

    Ok(CatalogItem {
        id: CatalogItemId::from_uuid(row.try_get("id").map_err(decode_error)?),
        name: row.try_get("name").map_err(decode_error)?,
        description: row.try_get("description").map_err(decode_error)?,
        eta_minutes: u32::try_from(eta)
            .map_err(|_| StoreError::Backend(format!("stored eta_minutes {eta} is negative")))?,
        active: row.try_get("active").map_err(decode_error)?,
        created_at: row.try_get("created_at").map_err(decode_error)?,
        updated_at: row.try_get("updated_at").map_err(decode_error)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Confirmations
// ─────────────────────────────────────────────────────────────────────────────

/// Postgres-backed confirmation store (`delivery_confirmations`).
#[derive(Debug, Clone)]
pub struct PostgresConfirmationStore {
    pool: Arc<PgPool>,
}

impl PostgresConfirmationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait]
impl ConfirmationStore for PostgresConfirmationStore {
    #[instrument(skip_all, fields(confirmation_id = %confirmation.id, order_id = %confirmation.order_id), err)]
    async fn insert(&self, confirmation: Confirmation) -> Result<Confirmation, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO delivery_confirmations
                (id, order_id, customer_name, address, status, delivered_at, delivered_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(confirmation.id.as_uuid())
        .bind(&confirmation.order_id)
        .bind(&confirmation.customer_name)
        .bind(&confirmation.address)
        .bind(confirmation.status.as_str())
        .bind(confirmation.delivered_at)
        .bind(confirmation.delivered_by.as_uuid())
        .bind(confirmation.created_at)
        .bind(confirmation.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_confirmation", e))?;

        Ok(confirmation)
    }

    #[instrument(skip(self), err)]
    async fn list_recent_first(&self) -> Result<Vec<Confirmation>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, customer_name, address, status, delivered_at, delivered_by, created_at, updated_at
            FROM delivery_confirmations
            ORDER BY delivered_at DESC NULLS LAST, created_at DESC, id DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_confirmations", e))?;

        rows.iter().map(confirmation_from_row).collect()
    }
}

fn confirmation_from_row(row: &PgRow) -> Result<Confirmation, StoreError> {
    let status: String = row.try_get("status").map_err(decode_error)?;

    Ok(Confirmation {
        id: ConfirmationId::from_uuid(row.try_get("id").map_err(decode_error)?),
        order_id: row.try_get("order_id").map_err(decode_error)?,
        customer_name: row.try_get("customer_name").map_err(decode_error)?,
        address: row.try_get("address").map_err(decode_error)?,
        status: status
            .parse::<ConfirmationStatus>()
            .map_err(|e| StoreError::Backend(format!("stored status: {e}")))?,
        delivered_at: row.try_get("delivered_at").map_err(decode_error)?,
        delivered_by: UserId::from_uuid(row.try_get("delivered_by").map_err(decode_error)?),
        created_at: row.try_get("created_at").map_err(decode_error)?,
        updated_at: row.try_get("updated_at").map_err(decode_error)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Error mapping
// ─────────────────────────────────────────────────────────────────────────────

fn decode_error(err: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("failed to decode row: {err}"))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());

            match db_err.code().as_deref() {
                // Unique violation
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
