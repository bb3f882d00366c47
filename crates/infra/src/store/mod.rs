//! Record storage.
//!
//! One [`RecordStore`] per record type. The in-memory implementation backs
//! dev and tests; the Postgres implementation backs production. Both enforce
//! the unique columns declared by [`Record::unique_fields`] so duplicate
//! inserts fail the same way everywhere.

pub mod bundle;
pub mod memory;
pub mod postgres;
pub mod records;

use async_trait::async_trait;
use thiserror::Error;

use cargodesk_core::{Filter, Record};

pub use bundle::Stores;
pub use memory::InMemoryRecordStore;
pub use postgres::{PgRecord, PgRecordStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// A unique column (or the primary key) already holds this value.
    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("referenced record does not exist: {0}")]
    ForeignKey(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found<R: Record>(id: R::Id) -> Self {
        Self::NotFound {
            kind: R::KIND,
            id: id.to_string(),
        }
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists(_))
    }
}

/// Async CRUD over one record type.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    /// Insert a new record. Fails with `AlreadyExists` on a duplicate id or unique column.
    async fn insert(&self, record: R) -> Result<R, StoreError>;

    async fn get(&self, id: R::Id) -> Result<Option<R>, StoreError>;

    /// All records, newest first.
    async fn list(&self) -> Result<Vec<R>, StoreError>;

    /// Records whose `filter.column` equals `filter.value`, newest first.
    async fn find_by(&self, filter: Filter) -> Result<Vec<R>, StoreError>;

    /// Replace an existing record. Fails with `NotFound` when the id is unknown.
    async fn update(&self, record: R) -> Result<R, StoreError>;

    async fn delete(&self, id: R::Id) -> Result<(), StoreError>;

    /// Like [`RecordStore::get`] but a missing record is an error.
    async fn require(&self, id: R::Id) -> Result<R, StoreError> {
        self.get(id).await?.ok_or_else(|| StoreError::not_found::<R>(id))
    }

    /// Check an optional reference held by another record. A dangling id is a
    /// `ForeignKey` error, the same thing Postgres reports for it.
    async fn ensure_exists(&self, id: Option<R::Id>) -> Result<(), StoreError> {
        let Some(id) = id else {
            return Ok(());
        };
        match self.get(id).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::ForeignKey(format!("{} {id}", R::KIND))),
        }
    }

    /// First record matching `filter`, if any.
    async fn find_one(&self, filter: Filter) -> Result<Option<R>, StoreError> {
        Ok(self.find_by(filter).await?.into_iter().next())
    }
}
