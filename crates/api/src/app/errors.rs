use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use cargodesk_core::DomainError;
use cargodesk_infra::{ServiceError, StoreError};

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = match &err {
        DomainError::Validation(_) | DomainError::InvalidId(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::InvariantViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let message = match &err {
        DomainError::NotFound(_) => err.to_string(),
        _ => err.detail().to_string(),
    };
    json_error(status, err.code(), message)
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        e @ StoreError::NotFound { .. } => json_error(StatusCode::NOT_FOUND, "not_found", e.to_string()),
        e @ StoreError::AlreadyExists(_) => json_error(StatusCode::CONFLICT, "already_exists", e.to_string()),
        e @ StoreError::ForeignKey(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "unknown_reference", e.to_string())
        }
        StoreError::Backend(msg) => {
            tracing::error!(error = %msg, "storage backend failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage failure")
        }
    }
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Store(e) => store_error_to_response(e),
    }
}

/// Malformed or mistyped JSON bodies are client errors, reported in the envelope.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": message.into(),
            "code": code,
        })),
    )
        .into_response()
}

/// Parse a path id into its typed form.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: core::str::FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(domain_error_to_response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let cases = [
            (StoreError::NotFound { kind: "order", id: "x".into() }, StatusCode::NOT_FOUND),
            (StoreError::AlreadyExists("client email".into()), StatusCode::CONFLICT),
            (StoreError::ForeignKey("customer 1".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (StoreError::Backend("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(store_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(
            domain_error_to_response(DomainError::validation("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            domain_error_to_response(DomainError::invariant("no")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            domain_error_to_response(DomainError::conflict("busy")).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn parse_id_rejects_garbage() {
        let res = parse_id::<cargodesk_shipments::OrderId>("nope").unwrap_err();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
