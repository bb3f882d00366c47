use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use cargodesk_parties::{Employee, EmployeeId, EmployeePatch, NewEmployee};

use crate::app::errors;
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_employees).post(create_employee))
        .route("/:id", get(get_employee).put(update_employee).delete(delete_employee))
        .route("/:id/deactivate", post(deactivate_employee))
}

pub async fn list_employees(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    common::list_all(services.stores.employees.as_ref()).await
}

pub async fn get_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::fetch(services.stores.employees.as_ref(), &id).await
}

pub async fn create_employee(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewEmployee>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    match Employee::create(EmployeeId::new(), body, Utc::now()) {
        Ok(employee) => common::create_or_existing(services.stores.employees.as_ref(), employee).await,
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<EmployeePatch>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<EmployeeId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };
    common::modify(services.stores.employees.as_ref(), id, |employee| {
        employee.apply_patch(patch, Utc::now())
    })
    .await
}

pub async fn deactivate_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<EmployeeId>(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    common::modify(services.stores.employees.as_ref(), id, |employee| {
        employee.deactivate(Utc::now())
    })
    .await
}

pub async fn delete_employee(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match errors::parse_id::<EmployeeId>(&id) {
        Ok(id) => common::remove(services.stores.employees.as_ref(), id).await,
        Err(res) => res,
    }
}
