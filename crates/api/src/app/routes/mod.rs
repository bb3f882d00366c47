use axum::{routing::get, Router};

pub mod auth;
pub mod clients;
pub mod common;
pub mod containers;
pub mod customers;
pub mod employees;
pub mod inventory;
pub mod invoices;
pub mod orders;
pub mod system;
pub mod tracking;

/// Router for all authenticated (admin) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/auth/session", get(auth::session))
        .nest("/clients", clients::router())
        .nest("/customers", customers::router())
        .nest("/employees", employees::router())
        .nest("/inventory", inventory::router())
        .nest("/containers", containers::router())
        .nest("/orders", orders::router())
        .nest("/invoices", invoices::router())
}
