use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;

use cargodesk_core::Filter;
use cargodesk_infra::{export, OrderStatusChange, StoreError};
use cargodesk_shipments::{
    NewOrder, NewTrackingEvent, Order, OrderId, OrderPatch, TrackingEvent, TrackingEventId,
};

use crate::app::routes::{common, tracking};
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/export.csv", get(export_orders))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
        .route("/:id/status", patch(change_status))
        .route("/:id/tracking", get(order_tracking).post(add_tracking_event))
        .route("/:id/qr.svg", get(order_qr_svg))
}

pub async fn list_orders(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    common::list_all(services.stores.orders.as_ref()).await
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::fetch(services.stores.orders.as_ref(), &id).await
}

/// Creates the order and its first tracking event.
pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let now = Utc::now();
    let order = match Order::create(OrderId::new(), body, now) {
        Ok(o) => o,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let stores = &services.stores;
    let references = async {
        stores.customers.ensure_exists(order.customer_id).await?;
        stores.clients.ensure_exists(order.client_id).await?;
        stores.containers.ensure_exists(order.container_id).await?;
        Ok::<(), StoreError>(())
    };
    if let Err(e) = references.await {
        return errors::store_error_to_response(e);
    }

    let order = match stores.orders.insert(order).await {
        Ok(o) => o,
        Err(e) => return errors::store_error_to_response(e),
    };
    let first_event = TrackingEvent::record(
        TrackingEventId::new(),
        order.id,
        NewTrackingEvent {
            status: order.status.as_str().to_string(),
            location: Some(order.origin.clone()),
            description: Some("Order registered".to_string()),
            occurred_at: Some(now),
        },
        now,
    );
    let first_event = match first_event {
        Ok(e) => e,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(e) = stores.tracking_events.insert(first_event).await {
        return errors::store_error_to_response(e);
    }

    tracing::info!(order_id = %order.id, order_number = %order.order_number, "order created");
    dto::created(order)
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<OrderPatch>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<OrderId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    let stores = &services.stores;
    let references = async {
        stores.customers.ensure_exists(patch.customer_id.flatten()).await?;
        stores.clients.ensure_exists(patch.client_id.flatten()).await?;
        stores.containers.ensure_exists(patch.container_id.flatten()).await?;
        Ok::<(), StoreError>(())
    };
    if let Err(e) = references.await {
        return errors::store_error_to_response(e);
    }

    common::modify(stores.orders.as_ref(), id, |order| order.apply_patch(patch, Utc::now())).await
}

/// Removes the order with its tracking history; invoices keep their record but
/// lose the link.
pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<OrderId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let stores = &services.stores;
    if let Err(e) = stores.orders.require(id).await {
        return errors::store_error_to_response(e);
    }

    let events = match stores.tracking_events.find_by(Filter::eq("order_id", id.as_uuid())).await {
        Ok(events) => events,
        Err(e) => return errors::store_error_to_response(e),
    };
    for event in events {
        if let Err(e) = stores.tracking_events.delete(event.id).await {
            return errors::store_error_to_response(e);
        }
    }

    let invoices = match stores.invoices.find_by(Filter::eq("order_id", id.as_uuid())).await {
        Ok(invoices) => invoices,
        Err(e) => return errors::store_error_to_response(e),
    };
    let now = Utc::now();
    for mut invoice in invoices {
        invoice.order_id = None;
        invoice.updated_at = now;
        if let Err(e) = stores.invoices.update(invoice).await {
            return errors::store_error_to_response(e);
        }
    }

    common::remove(stores.orders.as_ref(), id).await
}

pub async fn change_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::OrderStatusRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<OrderId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    let change = OrderStatusChange {
        status: body.status,
        location: body.location,
        description: body.description,
        notify: body.notify,
    };
    match services.orders.change_status(id, change).await {
        Ok(outcome) => dto::ok(outcome),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn order_tracking(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<OrderId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let order = match services.stores.orders.require(id).await {
        Ok(o) => o,
        Err(e) => return errors::store_error_to_response(e),
    };
    match tracking::tracking_view(&services, &order).await {
        Ok(view) => dto::ok(view),
        Err(res) => res,
    }
}

/// Record a history entry without changing the order's status.
pub async fn add_tracking_event(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<NewTrackingEvent>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<OrderId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    if let Err(e) = services.stores.orders.require(id).await {
        return errors::store_error_to_response(e);
    }
    let event = match TrackingEvent::record(TrackingEventId::new(), id, body, Utc::now()) {
        Ok(e) => e,
        Err(e) => return errors::domain_error_to_response(e),
    };
    common::create(services.stores.tracking_events.as_ref(), event).await
}

pub async fn order_qr_svg(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<OrderId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    match services.stores.orders.require(id).await {
        Ok(order) => tracking::qr_svg_response(&services.links.for_qr_code(&order.qr_code)),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn export_orders(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.stores.orders.list().await {
        Ok(orders) => csv_response("orders.csv", export::orders_csv(&orders)),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub(crate) fn csv_response(filename: &str, body: String) -> axum::response::Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response()
}
