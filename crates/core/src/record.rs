//! Persisted record abstraction shared by the stores.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A comparable column value used in filtered lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Id(Uuid),
    Text(String),
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Id(value)
    }
}

impl From<&Uuid> for FieldValue {
    fn from(value: &Uuid) -> Self {
        FieldValue::Id(*value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Equality filter on a single column (`column = value`).
///
/// Column names are always `'static` so they can be interpolated into SQL
/// without ever touching user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: &'static str,
    pub value: FieldValue,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<FieldValue>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }

    /// Whether `record` satisfies this filter (in-process evaluation).
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        record.field(self.column).as_ref() == Some(&self.value)
    }
}

/// A record with identity that the stores know how to keep.
pub trait Record: Clone + Send + Sync + 'static {
    /// Strongly-typed identifier.
    type Id: Copy
        + Eq
        + core::hash::Hash
        + core::fmt::Debug
        + core::fmt::Display
        + From<Uuid>
        + Into<Uuid>
        + Send
        + Sync
        + 'static;

    /// Human-readable kind, used in errors and logs (`"client"`, `"order"`, ...).
    const KIND: &'static str;

    fn id(&self) -> Self::Id;

    fn created_at(&self) -> DateTime<Utc>;

    /// Value of a filterable column, `None` when the column is unknown or null.
    fn field(&self, column: &str) -> Option<FieldValue>;

    /// Columns that must be unique across all records of this kind.
    fn unique_fields(&self) -> Vec<(&'static str, FieldValue)> {
        Vec::new()
    }
}
