use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use cargodesk_inventory::{InventoryItem, InventoryItemId, InventoryItemPatch, NewInventoryItem};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
        .route("/:id/adjust", post(adjust_stock))
}

pub async fn list_items(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    common::list_all(services.stores.inventory.as_ref()).await
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::fetch(services.stores.inventory.as_ref(), &id).await
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewInventoryItem>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    let item = match InventoryItem::create(InventoryItemId::new(), body, Utc::now()) {
        Ok(i) => i,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(e) = services.stores.clients.ensure_exists(item.client_id).await {
        return errors::store_error_to_response(e);
    }
    common::create_or_existing(services.stores.inventory.as_ref(), item).await
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<InventoryItemPatch>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<InventoryItemId>(&id) {
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
    common::modify(services.stores.inventory.as_ref(), id, |item| item.apply_patch(patch, Utc::now())).await
}

pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::AdjustStockRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<InventoryItemId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    tracing::info!(item_id = %id, delta = body.delta, "adjusting stock");
    common::modify(services.stores.inventory.as_ref(), id, |item| {
        item.adjust(body.delta, Utc::now()).map(|_| ())
    })
    .await
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match errors::parse_id::<InventoryItemId>(&id) {
        Ok(id) => common::remove(services.stores.inventory.as_ref(), id).await,
        Err(res) => res,
    }
}
