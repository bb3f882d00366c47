use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use cargodesk_auth::Role;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    if !services.admin.is_enabled() {
        tracing::warn!("login attempted but ADMIN_PASSWORD is not configured");
        return errors::json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "login_disabled",
            "admin login is not configured",
        );
    }

    if !services.admin.verify(&body.username, &body.password) {
        tracing::info!(username = %body.username, "rejected admin login");
        return errors::json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid credentials");
    }

    match services.tokens.issue(services.admin.username(), Role::ADMIN, Utc::now()) {
        Ok(issued) => {
            tracing::info!(username = %services.admin.username(), expires_at = %issued.expires_at, "admin logged in");
            dto::ok(issued)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to issue session token");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", "could not issue session")
        }
    }
}

pub async fn session(Extension(session): Extension<SessionContext>) -> axum::response::Response {
    dto::ok(dto::SessionView {
        username: session.username().to_string(),
        role: session.role().to_string(),
        expires_at: session.expires_at(),
    })
}
