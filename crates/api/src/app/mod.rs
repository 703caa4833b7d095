//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores and token service shared by handlers
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use delivery_auth::Role;

use crate::middleware::{self, AuthState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = AuthState {
        jwt: services.jwt_validator(),
    };

    // Any verified caller.
    let authenticated = routes::deliveries::protected_router().route_layer(
        axum::middleware::from_fn_with_state(auth_state.clone(), middleware::authenticate),
    );

    // Verified caller with the admin role. The last layer added runs first.
    let admin = routes::admin::router()
        .route_layer(axum::middleware::from_fn_with_state(Role::Admin, middleware::require_role))
        .route_layer(axum::middleware::from_fn_with_state(auth_state, middleware::authenticate));

    let api = Router::new()
        .nest("/auth", routes::auth::router())
        .nest("/deliveries", routes::deliveries::public_router().merge(authenticated))
        .nest("/admin", admin);

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(Extension(services)),
        )
}
