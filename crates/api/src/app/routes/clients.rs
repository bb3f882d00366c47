use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    routing::get,
    Json, Router,
};
use chrono::Utc;

use cargodesk_core::Filter;
use cargodesk_parties::{Client, ClientId, ClientPatch, NewClient};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::errors;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/:id", get(get_client).put(update_client).delete(delete_client))
}

pub async fn list_clients(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    common::list_all(services.stores.clients.as_ref()).await
}

pub async fn get_client(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::fetch(services.stores.clients.as_ref(), &id).await
}

pub async fn create_client(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewClient>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let client = match Client::create(ClientId::new(), body, Utc::now()) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };
    common::create_or_existing(services.stores.clients.as_ref(), client).await
}

pub async fn update_client(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<ClientPatch>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<ClientId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    common::modify(services.stores.clients.as_ref(), id, |client| {
        client.apply_patch(patch, Utc::now())
    })
    .await
}

/// Orders and invoices block deletion; customers and stock items are detached.
pub async fn delete_client(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<ClientId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let stores = &services.stores;
    if let Err(e) = stores.clients.require(id).await {
        return errors::store_error_to_response(e);
    }
    let by_client = || Filter::eq("client_id", id.as_uuid());
    if let Err(res) = common::ensure_unreferenced(stores.orders.as_ref(), by_client(), "orders").await {
        return res;
    }
    if let Err(res) = common::ensure_unreferenced(stores.invoices.as_ref(), by_client(), "invoices").await {
        return res;
    }

    let now = Utc::now();
    let customers = match stores.customers.find_by(by_client()).await {
        Ok(c) => c,
        Err(e) => return errors::store_error_to_response(e),
    };
    for mut customer in customers {
        customer.client_id = None;
        customer.updated_at = now;
        if let Err(e) = stores.customers.update(customer).await {
            return errors::store_error_to_response(e);
        }
    }
    let items = match stores.inventory.find_by(by_client()).await {
        Ok(i) => i,
        Err(e) => return errors::store_error_to_response(e),
    };
    for mut item in items {
        item.client_id = None;
        item.updated_at = now;
        if let Err(e) = stores.inventory.update(item).await {
            return errors::store_error_to_response(e);
        }
    }

    common::remove(stores.clients.as_ref(), id).await
}
