#![allow(dead_code)]

use async_trait::async_trait;
use autorest::store::Row;
use autorest::{
    Column, ColumnType, Logger, Record, RecordShape, RegisteredType, SqliteStore, Store, StoreError,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestType {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "String")]
    pub string: String,
    #[serde(rename = "Int")]
    pub int: i64,
}

impl Record for TestType {
    const SHAPE: RecordShape = RecordShape::new(
        "test_types",
        &[
            Column::new("String", ColumnType::Text),
            Column::new("Int", ColumnType::Integer),
        ],
    );
}

impl TestType {
    pub fn new(id: u64, string: &str, int: i64) -> Self {
        TestType {
            id,
            string: string.into(),
            int,
        }
    }
}

/// Collects every message the engine logs.
#[derive(Default)]
pub struct CapturingLogger {
    messages: Mutex<Vec<String>>,
}

impl CapturingLogger {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Logger for CapturingLogger {
    fn log(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

pub async fn sqlite_store() -> Arc<dyn Store> {
    Arc::new(SqliteStore::in_memory().await.unwrap())
}

pub async fn test_engine() -> RegisteredType<TestType> {
    RegisteredType::register(sqlite_store().await).await.unwrap()
}

/// Store whose data calls all fail with a non-"not found" database error.
pub struct FailingStore;

fn broken() -> StoreError {
    StoreError::Db(sqlx::Error::PoolClosed)
}

#[async_trait]
impl Store for FailingStore {
    async fn migrate(&self, _shape: &RecordShape) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(&self, _shape: &RecordShape, _row: &Row) -> Result<u64, StoreError> {
        Err(broken())
    }

    async fn first_by_id(&self, _shape: &RecordShape, _id: u64) -> Result<Row, StoreError> {
        Err(broken())
    }

    async fn count(&self, _shape: &RecordShape) -> Result<i64, StoreError> {
        Err(broken())
    }

    async fn query(
        &self,
        _shape: &RecordShape,
        _offset: Option<u64>,
        _limit: Option<u64>,
    ) -> Result<Vec<Row>, StoreError> {
        Err(broken())
    }

    async fn save(&self, _shape: &RecordShape, _id: u64, _row: &Row) -> Result<(), StoreError> {
        Err(broken())
    }

    async fn delete(&self, _shape: &RecordShape, _id: u64) -> Result<(), StoreError> {
        Err(broken())
    }
}

/// Delegates to `inner`, delaying every read by `delay`.
pub struct SlowStore {
    pub inner: Arc<dyn Store>,
    pub delay: Duration,
}

#[async_trait]
impl Store for SlowStore {
    async fn migrate(&self, shape: &RecordShape) -> Result<(), StoreError> {
        self.inner.migrate(shape).await
    }

    async fn insert(&self, shape: &RecordShape, row: &Row) -> Result<u64, StoreError> {
        self.inner.insert(shape, row).await
    }

    async fn first_by_id(&self, shape: &RecordShape, id: u64) -> Result<Row, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.first_by_id(shape, id).await
    }

    async fn count(&self, shape: &RecordShape) -> Result<i64, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.count(shape).await
    }

    async fn query(
        &self,
        shape: &RecordShape,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Row>, StoreError> {
        self.inner.query(shape, offset, limit).await
    }

    async fn save(&self, shape: &RecordShape, id: u64, row: &Row) -> Result<(), StoreError> {
        self.inner.save(shape, id, row).await
    }

    async fn delete(&self, shape: &RecordShape, id: u64) -> Result<(), StoreError> {
        self.inner.delete(shape, id).await
    }
}

/// Delegates to `inner`, but inserts `late` right after answering `count`, the way a
/// concurrent writer could between the two list calls.
pub struct RacingStore {
    pub inner: Arc<dyn Store>,
    pub late: Row,
}

#[async_trait]
impl Store for RacingStore {
    async fn migrate(&self, shape: &RecordShape) -> Result<(), StoreError> {
        self.inner.migrate(shape).await
    }

    async fn insert(&self, shape: &RecordShape, row: &Row) -> Result<u64, StoreError> {
        self.inner.insert(shape, row).await
    }

    async fn first_by_id(&self, shape: &RecordShape, id: u64) -> Result<Row, StoreError> {
        self.inner.first_by_id(shape, id).await
    }

    async fn count(&self, shape: &RecordShape) -> Result<i64, StoreError> {
        let total = self.inner.count(shape).await?;
        self.inner.insert(shape, &self.late).await?;
        Ok(total)
    }

    async fn query(
        &self,
        shape: &RecordShape,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Row>, StoreError> {
        self.inner.query(shape, offset, limit).await
    }

    async fn save(&self, shape: &RecordShape, id: u64, row: &Row) -> Result<(), StoreError> {
        self.inner.save(shape, id, row).await
    }

    async fn delete(&self, shape: &RecordShape, id: u64) -> Result<(), StoreError> {
        self.inner.delete(shape, id).await
    }
}
