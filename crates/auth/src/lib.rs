//! `delivery-auth`: authentication/authorization boundary.
//!
//! This crate is decoupled from HTTP and storage: it defines accounts and
//! roles, signs and verifies bearer tokens, hashes passwords, and answers
//! the role question for an already-verified principal.

pub mod authorize;
pub mod claims;
pub mod error;
pub mod password;
pub mod principal;
pub mod roles;
pub mod token;
pub mod user;

pub use authorize::{authorize, AuthzError};
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use error::AuthError;
pub use password::{hash_password, verify_password, verify_password_or_dummy, warm_dummy_hash};
pub use principal::Principal;
pub use roles::Role;
pub use token::{Hs256Jwt, IssuedToken, JwtValidator};
pub use user::{Credentials, Registration, User, UserProfile};
