use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cargodesk_invoicing::{Invoice, InvoiceStatus};

// -------------------------
// Envelope
// -------------------------

/// `{ "success": true, "data": ... }` with the given status.
pub fn envelope<T: Serialize>(status: StatusCode, data: T) -> axum::response::Response {
    (
        status,
        axum::Json(serde_json::json!({ "success": true, "data": data })),
    )
        .into_response()
}

pub fn ok<T: Serialize>(data: T) -> axum::response::Response {
    envelope(StatusCode::OK, data)
}

pub fn created<T: Serialize>(data: T) -> axum::response::Response {
    envelope(StatusCode::CREATED, data)
}

/// A create that matched a record already on file.
pub fn existing<T: Serialize>(data: T) -> axum::response::Response {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "success": true, "existing": true, "data": data })),
    )
        .into_response()
}

pub fn deleted() -> axum::response::Response {
    ok(serde_json::json!({ "deleted": true }))
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ContainerStatusRequest {
    pub status: String,
    #[serde(default)]
    pub cascade_orders: bool,
    #[serde(default = "default_true")]
    pub notify: bool,
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    pub status: String,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub notify: bool,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct RegisterPaymentRequest {
    pub amount_cents: i64,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub username: String,
    pub role: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Invoice plus the fields derived on read.
#[derive(Debug, Serialize)]
pub struct InvoiceView {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub effective_status: InvoiceStatus,
    pub outstanding_cents: i64,
}

impl InvoiceView {
    pub fn new(invoice: Invoice, today: NaiveDate) -> Self {
        Self {
            effective_status: invoice.effective_status(today),
            outstanding_cents: invoice.outstanding_cents(),
            invoice,
        }
    }
}
