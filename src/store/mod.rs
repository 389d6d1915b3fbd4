//! Store capability: relational persistence keyed by the `ID` column.
//!
//! Rows cross this boundary as JSON objects keyed by column name, so one store serves
//! every registered record type.

mod postgres;
mod sqlite;

pub use postgres::{ensure_database_exists, PgStore};
pub use sqlite::SqliteStore;

use crate::config::Settings;
use crate::error::StoreError;
use crate::record::RecordShape;
use async_trait::async_trait;
use std::sync::Arc;

/// One record in column-name → value form.
pub type Row = serde_json::Map<String, serde_json::Value>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Create the table if missing and add missing columns. Idempotent; never drops data.
    async fn migrate(&self, shape: &RecordShape) -> Result<(), StoreError>;

    /// Insert the shape's columns from `row`; returns the assigned ID.
    async fn insert(&self, shape: &RecordShape, row: &Row) -> Result<u64, StoreError>;

    /// Row with the given ID, or [`StoreError::NotFound`].
    async fn first_by_id(&self, shape: &RecordShape, id: u64) -> Result<Row, StoreError>;

    async fn count(&self, shape: &RecordShape) -> Result<i64, StoreError>;

    /// Rows ordered by ID, skipping `offset` and capped to `limit` when given.
    async fn query(
        &self,
        shape: &RecordShape,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Row>, StoreError>;

    /// Overwrite every shape column of the row with the given ID ([`StoreError::NotFound`] if none).
    async fn save(&self, shape: &RecordShape, id: u64, row: &Row) -> Result<(), StoreError>;

    /// Remove the row with the given ID ([`StoreError::NotFound`] if none).
    async fn delete(&self, shape: &RecordShape, id: u64) -> Result<(), StoreError>;
}

/// Build the store selected by `settings.database_url`: `postgres://` / `postgresql://`
/// use PostgreSQL (creating the database if needed), anything else is treated as SQLite.
pub async fn connect(settings: &Settings) -> Result<Arc<dyn Store>, StoreError> {
    let url = settings.database_url.as_str();
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        ensure_database_exists(url).await?;
        let store = PgStore::connect(url, settings.max_connections).await?;
        Ok(Arc::new(store))
    } else {
        let store = SqliteStore::connect(url, settings.max_connections).await?;
        Ok(Arc::new(store))
    }
}
