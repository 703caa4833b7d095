//! Delivery confirmations.
//!
//! A confirmation is written once, in delivered state, by the deliverer who
//! completed it. Pure domain logic; storage lives in `delivery-infra`.

pub mod confirmation;

pub use confirmation::{
    Confirmation, ConfirmationStatus, ConfirmationWithDeliverer, ConfirmDelivery, Deliverer,
};
