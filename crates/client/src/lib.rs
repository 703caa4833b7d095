//! Typed client for the delivery backend.
//!
//! Holds the issued token and signed-in user in memory for the lifetime of
//! the client value; nothing is persisted.

pub mod client;
pub mod types;

pub use client::{ClientError, DeliveryClient};
pub use types::{ConfirmDeliveryInput, ItemUpdate, NewItem, Session};
