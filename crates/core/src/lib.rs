//! `cargodesk-core`: building blocks shared by every domain crate.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the domain error model, the `Record` trait used by the
//! stores, and input validation helpers.

pub mod error;
pub mod id;
pub mod locale;
pub mod patch;
pub mod record;
pub mod validate;

pub use error::{DomainError, DomainResult};
pub use locale::Locale;
pub use record::{FieldValue, Filter, Record};

#[doc(hidden)]
pub use uuid as __uuid;
