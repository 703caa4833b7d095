use thiserror::Error;

use crate::{Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("insufficient role")]
    InsufficientRole { required: Role, actual: Role },
}

/// Authorize a verified principal against a required role.
///
/// - No IO
/// - No panics
/// - Pure predicate over the already-verified identity
pub fn authorize(principal: &Principal, required: Role) -> Result<(), AuthzError> {
    if principal.role == required {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole {
            required,
            actual: principal.role,
        })
    }
}
