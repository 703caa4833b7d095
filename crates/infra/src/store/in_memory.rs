use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use delivery_auth::User;
use delivery_catalog::{CatalogItem, CatalogItemPatch};
use delivery_confirmations::Confirmation;
use delivery_core::{CatalogItemId, Email, Entity, UserId};

use super::r#trait::{CatalogStore, ConfirmationStore, StoreError, UserStore};

/// Id-keyed record collection behind a single lock.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug)]
pub struct InMemoryCollection<E: Entity> {
    inner: RwLock<HashMap<E::Id, E>>,
}

impl<E: Entity> Default for InMemoryCollection<E> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<E> InMemoryCollection<E>
where
    E: Entity + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(id).cloned())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Insert `record` unless `reject` finds a reason not to.
    ///
    /// `reject` sees every stored record under the write lock, so checks it
    /// performs are atomic with the insert.
    pub fn insert_unless<F>(&self, record: E, reject: F) -> Result<E, StoreError>
    where
        F: Fn(&E, &E) -> Option<StoreError>,
    {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if let Some(err) = map.values().find_map(|existing| reject(existing, &record)) {
            return Err(err);
        }
        map.insert(*record.id(), record.clone());
        Ok(record)
    }

    /// Records passing `filter`, sorted by `cmp`.
    pub fn list<F, C>(&self, filter: F, cmp: C) -> Result<Vec<E>, StoreError>
    where
        F: Fn(&E) -> bool,
        C: FnMut(&E, &E) -> Ordering,
    {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut out: Vec<E> = map.values().filter(|e| filter(*e)).cloned().collect();
        out.sort_by(cmp);
        Ok(out)
    }

    /// Mutate a stored record in place. Returns the updated copy, or `None`
    /// when the id is unknown.
    pub fn modify<F>(&self, id: &E::Id, f: F) -> Result<Option<E>, StoreError>
    where
        F: FnOnce(&mut E),
    {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        Ok(map.get_mut(id).map(|record| {
            f(record);
            record.clone()
        }))
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

/// Newest first; ties broken by id (time-ordered) so listings are stable.
fn newest_first<E: Entity>(a: &E, b: &E) -> Ordering
where
    E::Id: Ord,
{
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.id().cmp(a.id()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory credential store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: InMemoryCollection<User>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<User, StoreError> {
        self.users.insert_unless(user, |existing, new| {
            (existing.email == new.email)
                .then(|| StoreError::Conflict(format!("email {} is already registered", new.email)))
        })
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let mut found = self.users.list(|u| &u.email == email, |_, _| Ordering::Equal)?;
        Ok(found.pop())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.users.get(&id)
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        self.users.list(|u| ids.contains(&u.id), |_, _| Ordering::Equal)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory catalog store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    items: InMemoryCollection<CatalogItem>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert(&self, item: CatalogItem) -> Result<CatalogItem, StoreError> {
        self.items.insert_unless(item, |existing, new| {
            (existing.id == new.id).then(|| StoreError::Conflict(format!("item {} already exists", new.id)))
        })
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.items.len()? as u64)
    }

    async fn list_active(&self) -> Result<Vec<CatalogItem>, StoreError> {
        self.items.list(|i| i.active, |a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)))
    }

    async fn list_all(&self) -> Result<Vec<CatalogItem>, StoreError> {
        self.items.list(|_| true, newest_first)
    }

    async fn update(
        &self,
        id: CatalogItemId,
        patch: &CatalogItemPatch,
        occurred_at: DateTime<Utc>,
    ) -> Result<CatalogItem, StoreError> {
        self.items
            .modify(&id, |item| item.apply(patch, occurred_at))?
            .ok_or(StoreError::NotFound("delivery item"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Confirmations
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory confirmation store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryConfirmationStore {
    confirmations: InMemoryCollection<Confirmation>,
}

impl InMemoryConfirmationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfirmationStore for InMemoryConfirmationStore {
    async fn insert(&self, confirmation: Confirmation) -> Result<Confirmation, StoreError> {
        self.confirmations.insert_unless(confirmation, |existing, new| {
            (existing.id == new.id)
                .then(|| StoreError::Conflict(format!("confirmation {} already exists", new.id)))
        })
    }

    async fn list_recent_first(&self) -> Result<Vec<Confirmation>, StoreError> {
        // `None` sorts below `Some`, so undelivered records land last.
        self.confirmations.list(
            |_| true,
            |a, b| b.delivered_at.cmp(&a.delivered_at).then_with(|| newest_first(a, b)),
        )
    }
}
