use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;

use cargodesk_core::Filter;
use cargodesk_infra::ContainerStatusChange;
use cargodesk_shipments::{Container, ContainerId, ContainerPatch, NewContainer};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_containers).post(create_container))
        .route("/:id", get(get_container).put(update_container).delete(delete_container))
        .route("/:id/status", patch(change_status))
        .route("/:id/orders", get(list_container_orders))
}

pub async fn list_containers(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    common::list_all(services.stores.containers.as_ref()).await
}

pub async fn get_container(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::fetch(services.stores.containers.as_ref(), &id).await
}

pub async fn create_container(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewContainer>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    match Container::create(ContainerId::new(), body, Utc::now()) {
        Ok(container) => common::create_or_existing(services.stores.containers.as_ref(), container).await,
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_container(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ContainerPatch>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<ContainerId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    common::modify(services.stores.containers.as_ref(), id, |container| {
        container.apply_patch(patch, Utc::now())
    })
    .await
}

pub async fn delete_container(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<ContainerId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let stores = &services.stores;
    if let Err(e) = stores.containers.require(id).await {
        return errors::store_error_to_response(e);
    }
    let in_container = Filter::eq("container_id", id.as_uuid());
    if let Err(res) = common::ensure_unreferenced(stores.orders.as_ref(), in_container, "orders").await {
        return res;
    }
    common::remove(stores.containers.as_ref(), id).await
}

pub async fn change_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::ContainerStatusRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<ContainerId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    let change = ContainerStatusChange {
        status: body.status,
        cascade_orders: body.cascade_orders,
        notify: body.notify,
    };
    match services.containers.change_status(id, change).await {
        Ok(outcome) => dto::ok(outcome),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_container_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<ContainerId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    if let Err(e) = services.stores.containers.require(id).await {
        return errors::store_error_to_response(e);
    }
    match services.stores.orders.find_by(Filter::eq("container_id", id.as_uuid())).await {
        Ok(orders) => dto::ok(orders),
        Err(e) => errors::store_error_to_response(e),
    }
}
