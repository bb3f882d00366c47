//! Infrastructure layer: configuration, record storage, notification flows
//! and exports.

pub mod config;
pub mod error;
pub mod export;
pub mod notifications;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::{ServiceError, ServiceResult};
pub use notifications::{
    ContainerNotifier, ContainerStatusChange, ContainerStatusOutcome, NotifyContext, OrderNotifier,
    OrderStatusChange, OrderStatusOutcome, TrackingLinks,
};
pub use store::{InMemoryRecordStore, PgRecord, PgRecordStore, RecordStore, StoreError, Stores};

/// Open a Postgres pool for `config`.
pub async fn connect_database(config: &config::DatabaseConfig) -> Result<sqlx::PgPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}
