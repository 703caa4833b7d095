//! Request gate: bearer token verification and role checks.
//!
//! The two layers are independent. `authenticate` attaches the verified
//! [`Principal`] to the request; `require_role` reads it back and must be
//! layered inside `authenticate`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use delivery_auth::{authorize, AuthError, JwtValidator, Principal, Role};

use crate::app::errors::ApiError;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?;

    let claims = state.jwt.validate(token, Utc::now())?;

    req.extensions_mut().insert(claims.principal());

    Ok(next.run(req).await)
}

pub async fn require_role(
    State(required): State<Role>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .copied()
        .ok_or(AuthError::MissingToken)?;

    authorize(&principal, required)?;

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let header = header.to_str().map_err(|_| AuthError::MissingToken)?;

    let header = header.strip_prefix("Bearer ").ok_or(AuthError::MissingToken)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::http::{header::AUTHORIZATION, HeaderValue};

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(extract_bearer(&headers("Bearer   abc ")).unwrap(), "abc");
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Err(AuthError::MissingToken));
        assert_eq!(extract_bearer(&headers("Basic abc")), Err(AuthError::MissingToken));
        assert_eq!(extract_bearer(&headers("Bearer ")), Err(AuthError::MissingToken));
        assert_eq!(extract_bearer(&headers("abc")), Err(AuthError::MissingToken));
    }
}
