use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    routing::get,
    Json, Router,
};
use chrono::Utc;

use cargodesk_core::Filter;
use cargodesk_parties::{Customer, CustomerId, CustomerPatch, NewCustomer};

use crate::app::errors;
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/:id", get(get_customer).put(update_customer).delete(delete_customer))
}

pub async fn list_customers(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    common::list_all(services.stores.customers.as_ref()).await
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::fetch(services.stores.customers.as_ref(), &id).await
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewCustomer>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let customer = match Customer::create(CustomerId::new(), body, Utc::now()) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(e) = services.stores.clients.ensure_exists(customer.client_id).await {
        return errors::store_error_to_response(e);
    }
    common::create_or_existing(services.stores.customers.as_ref(), customer).await
}

pub async fn update_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<CustomerPatch>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<CustomerId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    if let Err(e) = services.stores.clients.ensure_exists(patch.client_id.flatten()).await {
        return errors::store_error_to_response(e);
    }
    common::modify(services.stores.customers.as_ref(), id, |customer| {
        customer.apply_patch(patch, Utc::now())
    })
    .await
}

pub async fn delete_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<CustomerId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let stores = &services.stores;
    let by_customer = || Filter::eq("customer_id", id.as_uuid());
    if let Err(res) = common::ensure_unreferenced(stores.orders.as_ref(), by_customer(), "orders").await {
        return res;
    }
    if let Err(res) = common::ensure_unreferenced(stores.invoices.as_ref(), by_customer(), "invoices").await {
        return res;
    }
    common::remove(stores.customers.as_ref(), id).await
}
