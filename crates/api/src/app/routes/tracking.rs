//! Public tracking lookups (no session required).

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use qrcode::{render::svg, QrCode};

use cargodesk_core::Filter;
use cargodesk_shipments::{normalize_code, Order, TrackingView};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/qr/:code", get(track_by_qr_code))
        .route("/qr/:code/svg", get(qr_code_svg))
        .route("/order/:order_number", get(track_by_order_number))
}

pub async fn track_by_qr_code(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
) -> axum::response::Response {
    let order = match find_order(&services, "qr_code", &code).await {
        Ok(o) => o,
        Err(res) => return res,
    };
    match tracking_view(&services, &order).await {
        Ok(view) => dto::ok(view),
        Err(res) => res,
    }
}

pub async fn track_by_order_number(
    Extension(services): Extension<Arc<AppServices>>,
    Path(order_number): Path<String>,
) -> axum::response::Response {
    let order = match find_order(&services, "order_number", &order_number).await {
        Ok(o) => o,
        Err(res) => return res,
    };
    match tracking_view(&services, &order).await {
        Ok(view) => dto::ok(view),
        Err(res) => res,
    }
}

pub async fn qr_code_svg(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
) -> axum::response::Response {
    match find_order(&services, "qr_code", &code).await {
        Ok(order) => qr_svg_response(&services.links.for_qr_code(&order.qr_code)),
        Err(res) => res,
    }
}

async fn find_order(
    services: &AppServices,
    column: &'static str,
    raw: &str,
) -> Result<Order, axum::response::Response> {
    let code = normalize_code(raw);
    match services.stores.orders.find_one(Filter::eq(column, code)).await {
        Ok(Some(order)) => Ok(order),
        Ok(None) => Err(errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "no shipment matches that code",
        )),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

/// Order, its container (if loaded) and its full event history.
pub(crate) async fn tracking_view(
    services: &AppServices,
    order: &Order,
) -> Result<TrackingView, axum::response::Response> {
    let container = match order.container_id {
        Some(id) => services
            .stores
            .containers
            .get(id)
            .await
            .map_err(errors::store_error_to_response)?,
        None => None,
    };
    let events = services
        .stores
        .tracking_events
        .find_by(Filter::eq("order_id", order.id.as_uuid()))
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(TrackingView::build(order, container.as_ref(), events))
}

/// SVG QR code encoding `link`.
pub(crate) fn qr_svg_response(link: &str) -> axum::response::Response {
    let code = match QrCode::new(link.as_bytes()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, link, "failed to encode tracking link");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "qr_error", "could not render QR code");
        }
    };
    let image = code
        .render::<svg::Color<'_>>()
        .min_dimensions(256, 256)
        .quiet_zone(true)
        .build();
    (StatusCode::OK, [(header::CONTENT_TYPE, "image/svg+xml")], image).into_response()
}
