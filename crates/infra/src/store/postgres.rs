//! Postgres-backed record store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `AlreadyExists` |
//! | Database (foreign key violation) | `23503` | `ForeignKey` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / network / decode | N/A | `Backend` |
//!
//! Column and table names come from [`PgRecord`] constants only; user input
//! is always bound as a parameter.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use cargodesk_core::{FieldValue, Filter, Record};

use super::{RecordStore, StoreError};

/// Table mapping for a record type.
pub trait PgRecord: Record {
    const TABLE: &'static str;

    /// Every column, in the order [`PgRecord::push_binds`] binds them. `id` first.
    const COLUMNS: &'static [&'static str];

    /// `ORDER BY` clause used by `list` and `find_by`.
    const ORDER_BY: &'static str = "created_at DESC";

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;

    /// Bind one value per entry of [`PgRecord::COLUMNS`].
    fn push_binds<'args>(&self, values: &mut Separated<'_, 'args, Postgres, &'static str>);
}

/// Generic store over one table.
pub struct PgRecordStore<R> {
    pool: Arc<PgPool>,
    _record: PhantomData<fn() -> R>,
}

impl<R> PgRecordStore<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
            _record: PhantomData,
        }
    }
}

impl<R> Clone for PgRecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

fn select_prefix<R: PgRecord>() -> String {
    format!("SELECT {} FROM {}", R::COLUMNS.join(", "), R::TABLE)
}

fn decode_rows<R: PgRecord>(rows: Vec<PgRow>) -> Result<Vec<R>, StoreError> {
    rows.iter()
        .map(|row| R::from_row(row).map_err(|e| map_sqlx_error("decode_row", e)))
        .collect()
}

#[async_trait]
impl<R: PgRecord> RecordStore<R> for PgRecordStore<R> {
    #[instrument(skip(self, record), fields(kind = R::KIND, id = %record.id()), err)]
    async fn insert(&self, record: R) -> Result<R, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            R::TABLE,
            R::COLUMNS.join(", ")
        ));
        {
            let mut values = qb.separated(", ");
            record.push_binds(&mut values);
        }
        qb.push(")");

        qb.build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;
        Ok(record)
    }

    #[instrument(skip(self), fields(kind = R::KIND), err)]
    async fn get(&self, id: R::Id) -> Result<Option<R>, StoreError> {
        let sql = format!("{} WHERE id = $1", select_prefix::<R>());
        let row = sqlx::query(&sql)
            .bind(Into::<Uuid>::into(id))
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.map(|r| R::from_row(&r).map_err(|e| map_sqlx_error("decode_row", e)))
            .transpose()
    }

    #[instrument(skip(self), fields(kind = R::KIND), err)]
    async fn list(&self) -> Result<Vec<R>, StoreError> {
        let sql = format!("{} ORDER BY {}", select_prefix::<R>(), R::ORDER_BY);
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;
        decode_rows(rows)
    }

    #[instrument(skip(self), fields(kind = R::KIND, column = filter.column), err)]
    async fn find_by(&self, filter: Filter) -> Result<Vec<R>, StoreError> {
        if !R::COLUMNS.contains(&filter.column) {
            return Err(StoreError::Backend(format!(
                "{} has no column {}",
                R::TABLE,
                filter.column
            )));
        }
        let sql = format!(
            "{} WHERE {} = $1 ORDER BY {}",
            select_prefix::<R>(),
            filter.column,
            R::ORDER_BY
        );
        let query = sqlx::query(&sql);
        let query = match filter.value {
            FieldValue::Id(id) => query.bind(id),
            FieldValue::Text(text) => query.bind(text),
        };
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by", e))?;
        decode_rows(rows)
    }

    #[instrument(skip(self, record), fields(kind = R::KIND, id = %record.id()), err)]
    async fn update(&self, record: R) -> Result<R, StoreError> {
        // Multi-column assignment keeps the bind order identical to insert.
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "UPDATE {} SET ({}) = ROW(",
            R::TABLE,
            R::COLUMNS.join(", ")
        ));
        {
            let mut values = qb.separated(", ");
            record.push_binds(&mut values);
        }
        qb.push(") WHERE id = ");
        qb.push_bind(Into::<Uuid>::into(record.id()));

        let result = qb
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found::<R>(record.id()));
        }
        Ok(record)
    }

    #[instrument(skip(self), fields(kind = R::KIND), err)]
    async fn delete(&self, id: R::Id) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", R::TABLE);
        let result = sqlx::query(&sql)
            .bind(Into::<Uuid>::into(id))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found::<R>(id));
        }
        Ok(())
    }
}

/// Map SQLx errors to StoreError.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = match db_err.constraint() {
                Some(constraint) => format!("{} ({})", db_err.message(), constraint),
                None => db_err.message().to_string(),
            };
            match db_err.code().as_deref() {
                Some("23505") => StoreError::AlreadyExists(msg),
                Some("23503") => StoreError::ForeignKey(msg),
                _ => StoreError::Backend(format!("database error in {operation}: {msg}")),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

/// Wrap a domain parse failure raised while decoding a column.
pub(crate) fn decode_error(
    err: impl std::error::Error + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(err))
}
