use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use delivery_auth::User;
use delivery_catalog::{CatalogItem, CatalogItemPatch};
use delivery_confirmations::Confirmation;
use delivery_core::{CatalogItemId, Email, UserId};

/// Store operation error.
///
/// These are **infrastructure errors** as opposed to domain errors
/// (validation). `Conflict` and `NotFound` are the two outcomes callers are
/// expected to branch on; everything else is `Backend`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// The backend failed (connection, decoding, poisoned lock, ...).
    #[error("storage error: {0}")]
    Backend(String),
}

/// Credential store: user accounts keyed by id, unique by email.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new account. Fails with `Conflict` if the email is taken.
    async fn insert(&self, user: User) -> Result<User, StoreError>;

    /// Look up an account by its normalised email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Fetch every account in `ids` that exists, in no particular order.
    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError>;
}

/// Catalog store: delivery-service offerings.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert(&self, item: CatalogItem) -> Result<CatalogItem, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Active items only, ordered by name ascending (bytewise).
    async fn list_active(&self) -> Result<Vec<CatalogItem>, StoreError>;

    /// Every item, newest first.
    async fn list_all(&self) -> Result<Vec<CatalogItem>, StoreError>;

    /// Apply `patch` to an existing item and return the updated record.
    /// Fails with `NotFound` for an unknown id.
    async fn update(
        &self,
        id: CatalogItemId,
        patch: &CatalogItemPatch,
        occurred_at: DateTime<Utc>,
    ) -> Result<CatalogItem, StoreError>;
}

/// Confirmation store: append-only delivery confirmations.
#[async_trait]
pub trait ConfirmationStore: Send + Sync {
    async fn insert(&self, confirmation: Confirmation) -> Result<Confirmation, StoreError>;

    /// Every confirmation, most recently delivered first.
    async fn list_recent_first(&self) -> Result<Vec<Confirmation>, StoreError>;
}
