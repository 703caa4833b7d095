use serde::{Deserialize, Serialize};

use delivery_core::UserId;

use crate::Role;

/// Identity of an authenticated caller, as decoded from a verified token.
///
/// Attached to the request by the verification layer; the role check and
/// handlers read it without touching the credential store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
