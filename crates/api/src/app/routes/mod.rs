pub mod admin;
pub mod auth;
pub mod deliveries;
pub mod system;
