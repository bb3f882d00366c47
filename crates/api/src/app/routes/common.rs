//! Handler helpers shared by the resource routes.

use core::str::FromStr;

use serde::Serialize;

use cargodesk_core::{DomainError, DomainResult, Filter, Record};
use cargodesk_infra::RecordStore;

use crate::app::{dto, errors};

type Response = axum::response::Response;

pub async fn list_all<R>(store: &dyn RecordStore<R>) -> Response
where
    R: Record + Serialize,
{
    match store.list().await {
        Ok(items) => dto::ok(items),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn fetch<R>(store: &dyn RecordStore<R>, raw_id: &str) -> Response
where
    R: Record + Serialize,
    R::Id: FromStr<Err = DomainError>,
{
    let id = match errors::parse_id::<R::Id>(raw_id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    match store.require(id).await {
        Ok(record) => dto::ok(record),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Insert `record`; a record already on file with the same unique key is
/// returned as an idempotent success instead of a conflict.
pub async fn create_or_existing<R>(store: &dyn RecordStore<R>, record: R) -> Response
where
    R: Record + Serialize,
{
    let unique = record.unique_fields();
    let err = match store.insert(record).await {
        Ok(saved) => {
            tracing::info!(kind = R::KIND, id = %saved.id(), "record created");
            return dto::created(saved);
        }
        Err(e) => e,
    };
    if !err.is_already_exists() {
        return errors::store_error_to_response(err);
    }

    for (column, value) in unique {
        match store.find_one(Filter { column, value }).await {
            Ok(Some(found)) => {
                tracing::info!(kind = R::KIND, id = %found.id(), column, "create matched existing record");
                return dto::existing(found);
            }
            Ok(None) => {}
            Err(e) => return errors::store_error_to_response(e),
        }
    }
    errors::store_error_to_response(err)
}

/// Insert `record`; duplicates are conflicts.
pub async fn create<R>(store: &dyn RecordStore<R>, record: R) -> Response
where
    R: Record + Serialize,
{
    match store.insert(record).await {
        Ok(saved) => {
            tracing::info!(kind = R::KIND, id = %saved.id(), "record created");
            dto::created(saved)
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Load, change and save one record.
pub async fn modify<R, F>(store: &dyn RecordStore<R>, id: R::Id, apply: F) -> Response
where
    R: Record + Serialize,
    F: FnOnce(&mut R) -> DomainResult<()> + Send,
{
    let mut record = match store.require(id).await {
        Ok(r) => r,
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = apply(&mut record) {
        return errors::domain_error_to_response(e);
    }
    match store.update(record).await {
        Ok(saved) => dto::ok(saved),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn remove<R>(store: &dyn RecordStore<R>, id: R::Id) -> Response
where
    R: Record,
{
    match store.delete(id).await {
        Ok(()) => {
            tracing::info!(kind = R::KIND, %id, "record deleted");
            dto::deleted()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Refuse to delete a record that `dependents` still point at.
pub async fn ensure_unreferenced<D>(
    dependents: &dyn RecordStore<D>,
    filter: Filter,
    what: &str,
) -> Result<(), Response>
where
    D: Record,
{
    match dependents.find_one(filter).await {
        Ok(None) => Ok(()),
        Ok(Some(_)) => Err(errors::domain_error_to_response(DomainError::conflict(format!(
            "still referenced by {what}"
        )))),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}
