//! Infrastructure layer: persistence backends and startup seeding.

pub mod seed;
pub mod store;

pub use seed::{SeedError, SeedOutcome, seed_admin, seed_menu};
pub use store::{CatalogStore, ConfirmationStore, StoreError, Stores, UserStore};
