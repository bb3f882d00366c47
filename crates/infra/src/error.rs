use thiserror::Error;

use cargodesk_core::DomainError;

use crate::store::StoreError;

/// Failure of a use case that touches both domain rules and storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
