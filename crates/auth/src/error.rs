use thiserror::Error;

/// Authentication failures (who are you).
///
/// The `Display` strings of the first three variants are returned to callers
/// verbatim; keep them free of detail that distinguishes failure causes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing token")]
    MissingToken,

    #[error("invalid or expired token")]
    InvalidToken,

    /// Unknown email and wrong password both map here.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("password hashing failed")]
    PasswordHash,
}

impl AuthError {
    /// Whether this error is caused by the caller (401) rather than by the
    /// server failing to do its part.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::InvalidCredentials
        )
    }
}
