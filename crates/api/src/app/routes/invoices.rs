use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use cargodesk_core::{DomainError, DomainResult};
use cargodesk_infra::{export, StoreError};
use cargodesk_invoicing::{Invoice, InvoiceId, InvoicePatch, NewInvoice};

use crate::app::routes::{common, orders::csv_response};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/export.csv", get(export_invoices))
        .route("/:id", get(get_invoice).put(update_invoice).delete(delete_invoice))
        .route("/:id/send", post(send_invoice))
        .route("/:id/payments", post(register_payment))
        .route("/:id/void", post(void_invoice))
}

fn view(invoice: Invoice) -> dto::InvoiceView {
    dto::InvoiceView::new(invoice, Utc::now().date_naive())
}

pub async fn list_invoices(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.stores.invoices.list().await {
        Ok(invoices) => dto::ok(invoices.into_iter().map(view).collect::<Vec<_>>()),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<InvoiceId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    match services.stores.invoices.require(id).await {
        Ok(invoice) => dto::ok(view(invoice)),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewInvoice>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let invoice = match Invoice::create(InvoiceId::new(), body, Utc::now()) {
        Ok(i) => i,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let stores = &services.stores;
    let references = async {
        stores.clients.ensure_exists(invoice.client_id).await?;
        stores.customers.ensure_exists(invoice.customer_id).await?;
        stores.orders.ensure_exists(invoice.order_id).await?;
        Ok::<(), StoreError>(())
    };
    if let Err(e) = references.await {
        return errors::store_error_to_response(e);
    }

    match stores.invoices.insert(invoice).await {
        Ok(saved) => {
            tracing::info!(invoice_id = %saved.id, invoice_number = %saved.invoice_number, total_cents = saved.total_cents, "invoice created");
            dto::created(view(saved))
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<InvoicePatch>, JsonRejection>,
) -> axum::response::Response {
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    transition(&services, &id, |invoice| invoice.apply_patch(patch, Utc::now())).await
}

pub async fn send_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    transition(&services, &id, |invoice| invoice.mark_sent(Utc::now())).await
}

pub async fn register_payment(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::RegisterPaymentRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    transition(&services, &id, |invoice| {
        invoice.register_payment(body.amount_cents, Utc::now())
    })
    .await
}

pub async fn void_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    transition(&services, &id, |invoice| invoice.void(Utc::now())).await
}

/// Invoices with payments on record stay for the books.
pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<InvoiceId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let invoice = match services.stores.invoices.require(id).await {
        Ok(i) => i,
        Err(e) => return errors::store_error_to_response(e),
    };
    if invoice.amount_paid_cents > 0 {
        return errors::domain_error_to_response(DomainError::conflict(
            "invoices with payments cannot be deleted; void them instead",
        ));
    }
    common::remove(services.stores.invoices.as_ref(), id).await
}

pub async fn export_invoices(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.stores.invoices.list().await {
        Ok(invoices) => csv_response(
            "invoices.csv",
            export::invoices_csv(&invoices, Utc::now().date_naive()),
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn transition<F>(services: &AppServices, raw_id: &str, apply: F) -> axum::response::Response
where
    F: FnOnce(&mut Invoice) -> DomainResult<()> + Send,
{
    let id = match errors::parse_id::<InvoiceId>(raw_id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let mut invoice = match services.stores.invoices.require(id).await {
        Ok(i) => i,
        Err(e) => return errors::store_error_to_response(e),
    };
    let before = invoice.status;
    if let Err(e) = apply(&mut invoice) {
        return errors::domain_error_to_response(e);
    }
    match services.stores.invoices.update(invoice).await {
        Ok(saved) => {
            if saved.status != before {
                tracing::info!(invoice_id = %saved.id, from = before.as_str(), to = saved.status.as_str(), "invoice status changed");
            }
            dto::ok(view(saved))
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
