//! Delivery-service catalog.
//!
//! Business rules for menu items, as deterministic domain logic (no IO, no
//! HTTP, no storage).

pub mod item;

pub use item::{default_menu, CatalogItem, CatalogItemPatch, NewCatalogItem};
