//! Account routes: registration and login. Both are public.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use delivery_auth::{Credentials, Registration};

use crate::app::dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// POST /api/auth/register - Create a delivery account
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(body) = payload?;
    let registration = Registration::parse(
        body.name.as_deref(),
        body.email.as_deref(),
        body.password.as_deref(),
    )?;

    let user = services.register(registration, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}

/// POST /api/auth/login - Exchange credentials for a bearer token
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = payload?;
    let credentials = Credentials::parse(body.email.as_deref(), body.password.as_deref())?;

    let (token, user) = services.login(credentials, Utc::now()).await?;
    Ok(Json(LoginResponse {
        token: token.token,
        user,
    }))
}
