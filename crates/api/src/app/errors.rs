//! Consistent JSON error responses: `{"error": <code>, "message": <text>}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use delivery_auth::{AuthError, AuthzError};
use delivery_core::DomainError;
use delivery_infra::StoreError;

/// Every failure a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Auth(AuthError),

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    /// Logged with detail, returned without it.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Auth(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "internal server error".to_string()
            }
            ApiError::Auth(_) | ApiError::Forbidden(_) => {
                tracing::debug!(error = %self, "request rejected");
                self.to_string()
            }
            other => other.to_string(),
        };

        json_error(self.status(), self.code(), message)
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_client_error() {
            ApiError::Auth(err)
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ApiError::Validation(msg),
            DomainError::NotFound(what) => ApiError::NotFound(what),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::Backend(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("invalid JSON body: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use delivery_auth::Role;

    use super::*;

    #[test]
    fn maps_each_kind_to_its_status() {
        let cases = [
            (ApiError::from(DomainError::validation("bad")), StatusCode::BAD_REQUEST),
            (ApiError::from(AuthError::InvalidToken), StatusCode::UNAUTHORIZED),
            (
                ApiError::from(AuthzError::InsufficientRole {
                    required: Role::Admin,
                    actual: Role::Delivery,
                }),
                StatusCode::FORBIDDEN,
            ),
            (ApiError::from(StoreError::NotFound("delivery item")), StatusCode::NOT_FOUND),
            (ApiError::from(StoreError::Conflict("dup".into())), StatusCode::CONFLICT),
            (ApiError::from(StoreError::Backend("down".into())), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err:?}");
        }
    }

    #[test]
    fn server_side_auth_failures_are_internal() {
        let err = ApiError::from(AuthError::PasswordHash);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn messages_are_caller_facing() {
        assert_eq!(
            ApiError::from(DomainError::validation("missing delivery details")).to_string(),
            "missing delivery details"
        );
        assert_eq!(ApiError::NotFound("delivery item").to_string(), "delivery item not found");
        assert_eq!(ApiError::from(AuthError::MissingToken).to_string(), "missing token");
    }
}
