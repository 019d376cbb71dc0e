//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: account store, identity provider and session store wiring
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: JSON error bodies

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::{authz, middleware};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    let pages = routes::page_router().route_layer(axum::middleware::from_fn_with_state(
        services.clone(),
        authz::require_page_session,
    ));

    let api = routes::api_router().route_layer(axum::middleware::from_fn_with_state(
        services.clone(),
        authz::require_api_session,
    ));

    // Health checks skip session handling entirely.
    let sessioned = routes::session_router()
        .merge(pages)
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(Extension(services.clone()))
                .layer(axum::middleware::from_fn_with_state(
                    services,
                    middleware::session_middleware,
                )),
        );

    Router::new()
        .route("/health", axum::routing::get(routes::system::health))
        .merge(sessioned)
}
