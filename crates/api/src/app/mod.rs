//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores, notification flows, credentials and tokens
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request bodies, response views and the JSON envelope
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the tests).
pub fn build_app(services: services::AppServices) -> Router {
    let services = Arc::new(services);
    let auth_state = middleware::AuthState {
        tokens: services.tokens.clone(),
    };

    // Admin routes: require a valid session token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/auth/login", post(routes::auth::login))
        .nest("/track", routes::tracking::router())
        .merge(protected)
        .fallback(routes::system::not_found)
        .layer(Extension(services))
}
