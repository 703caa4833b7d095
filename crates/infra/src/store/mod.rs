//! Persistence boundary for accounts, catalog items and confirmations.
//!
//! Each record kind has its own store trait with an in-memory implementation
//! (tests, local runs without a database) and a Postgres one.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

use std::sync::Arc;

use sqlx::PgPool;

pub use in_memory::{InMemoryCatalogStore, InMemoryCollection, InMemoryConfirmationStore, InMemoryUserStore};
pub use postgres::{PostgresCatalogStore, PostgresConfirmationStore, PostgresUserStore};
pub use r#trait::{CatalogStore, ConfirmationStore, StoreError, UserStore};

/// The three stores the service runs against, sharing one backend.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub confirmations: Arc<dyn ConfirmationStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserStore::new()),
            catalog: Arc::new(InMemoryCatalogStore::new()),
            confirmations: Arc::new(InMemoryConfirmationStore::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserStore::new(pool.clone())),
            catalog: Arc::new(PostgresCatalogStore::new(pool.clone())),
            confirmations: Arc::new(PostgresConfirmationStore::new(pool)),
        }
    }
}
