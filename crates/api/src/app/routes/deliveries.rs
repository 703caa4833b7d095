use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use delivery_auth::Principal;
use delivery_catalog::CatalogItem;
use delivery_confirmations::{Confirmation, ConfirmDelivery};

use crate::app::dto::ConfirmDeliveryRequest;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// Public menu.
pub fn public_router() -> Router {
    Router::new().route("/menu", get(menu))
}

/// Routes that need a verified caller (any role).
pub fn protected_router() -> Router {
    Router::new().route("/confirm", post(confirm))
}

/// GET /api/deliveries/menu - Active items, by name
pub async fn menu(Extension(services): Extension<Arc<AppServices>>) -> Result<Json<Vec<CatalogItem>>, ApiError> {
    Ok(Json(services.menu().await?))
}

/// POST /api/deliveries/confirm - Confirm a delivery as the caller
pub async fn confirm(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<ConfirmDeliveryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Confirmation>), ApiError> {
    let Json(body) = payload?;
    let cmd = ConfirmDelivery::parse(
        body.order_id.as_deref(),
        body.customer_name.as_deref(),
        body.address.as_deref(),
    )?;

    let confirmation = services.confirm(&principal, cmd, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}
