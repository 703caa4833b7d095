//! Admin panel routes. Every route here is layered behind the admin role.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;

use delivery_catalog::{CatalogItem, CatalogItemPatch, NewCatalogItem};
use delivery_confirmations::ConfirmationWithDeliverer;
use delivery_core::CatalogItemId;

use crate::app::dto::ItemRequest;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/confirmations", get(list_confirmations))
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", put(update_item))
}

/// GET /api/admin/confirmations - All confirmations with deliverer
pub async fn list_confirmations(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<ConfirmationWithDeliverer>>, ApiError> {
    Ok(Json(services.list_confirmations().await?))
}

/// GET /api/admin/items - All items, newest first
pub async fn list_items(Extension(services): Extension<Arc<AppServices>>) -> Result<Json<Vec<CatalogItem>>, ApiError> {
    Ok(Json(services.list_items().await?))
}

/// POST /api/admin/items - Create an item
pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CatalogItem>), ApiError> {
    let Json(body) = payload?;
    let new = NewCatalogItem::parse(
        body.name.as_deref(),
        body.description.as_deref(),
        body.eta_minutes,
        Some(body.active_on_create()),
    )?;

    let item = services.create_item(new, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/admin/items/:id - Partially update an item
pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> Result<Json<CatalogItem>, ApiError> {
    // An id that cannot exist is reported the same as one that does not.
    let id: CatalogItemId = id.parse().map_err(|_| ApiError::NotFound("delivery item"))?;

    let Json(body) = payload?;
    let patch = CatalogItemPatch::parse(
        body.name.as_deref(),
        body.description.as_deref(),
        body.eta_minutes,
        body.active_flag(),
    )?;

    Ok(Json(services.update_item(id, patch, Utc::now()).await?))
}
