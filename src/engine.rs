//! Generic CRUD engine: one [`RegisteredType`] per record type, bound to a store handle.
//!
//! Every operation runs to completion on the calling task, logs a failure once through the
//! given [`Logger`] and reports a [`Status`]; nothing crosses this boundary as an `Err`.

use crate::decoder::Decoder;
use crate::error::{EngineError, StoreError};
use crate::logger::Logger;
use crate::record::{Record, RecordShape};
use crate::response::ListEnvelope;
use crate::status::Status;
use crate::store::{Row, Store};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

pub struct RegisteredType<T> {
    shape: RecordShape,
    store: Arc<dyn Store>,
    timeout: Option<Duration>,
    _record: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for RegisteredType<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredType")
            .field("shape", &self.shape)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<T: Record> RegisteredType<T> {
    /// Validate `T::SHAPE` and migrate the store to it (create table, add missing columns).
    pub async fn register(store: Arc<dyn Store>) -> Result<Self, StoreError> {
        let shape = T::SHAPE;
        shape.validate()?;
        store.migrate(&shape).await?;
        tracing::info!(table = shape.table, columns = shape.columns.len(), "registered record type");
        Ok(RegisteredType {
            shape,
            store,
            timeout: None,
            _record: PhantomData,
        })
    }

    /// Bound every store call by `timeout`; an expired call reports [`Status::InternalError`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn shape(&self) -> &RecordShape {
        &self.shape
    }

    /// Decode a full record and insert it. The assigned ID is not returned.
    pub async fn create<D>(&self, log: &dyn Logger, decoder: D) -> Status
    where
        D: Decoder + Send,
    {
        match self.try_create(decoder).await {
            Ok(id) => {
                tracing::debug!(table = self.shape.table, id, "created");
                Status::Ok
            }
            Err(e) => report(log, e),
        }
    }

    pub async fn read(&self, log: &dyn Logger, id: u64) -> (Option<T>, Status) {
        match self.try_read(id).await {
            Ok(record) => (Some(record), Status::Ok),
            Err(e) => (None, report(log, e)),
        }
    }

    /// One page of records plus the total count. `0` leaves `page`/`limit` unset.
    ///
    /// A nonzero `page` skips `page * limit` records, so a page without a limit skips nothing.
    /// The count and the page are two separate store calls without snapshot isolation.
    pub async fn list(&self, log: &dyn Logger, page: u32, limit: u32) -> (Option<ListEnvelope<T>>, Status) {
        match self.try_list(page, limit).await {
            Ok(envelope) => (Some(envelope), Status::Ok),
            Err(e) => (None, report(log, e)),
        }
    }

    /// Fetch, overlay the (partial) payload, and write the merged record back.
    pub async fn update<D>(&self, log: &dyn Logger, id: u64, decoder: D) -> Status
    where
        D: Decoder + Send,
    {
        match self.try_update(id, decoder).await {
            Ok(()) => Status::Ok,
            Err(e) => report(log, e),
        }
    }

    pub async fn delete(&self, log: &dyn Logger, id: u64) -> Status {
        match self.bounded(self.store.delete(&self.shape, id)).await {
            Ok(()) => Status::Ok,
            Err(e) => report(log, e),
        }
    }

    async fn try_create<D: Decoder>(&self, decoder: D) -> Result<u64, EngineError> {
        let mut record = T::default();
        decoder.decode(&mut record)?;
        let row = to_row(&record)?;
        self.bounded(self.store.insert(&self.shape, &row)).await
    }

    async fn try_read(&self, id: u64) -> Result<T, EngineError> {
        let row = self.bounded(self.store.first_by_id(&self.shape, id)).await?;
        from_row(row)
    }

    async fn try_list(&self, page: u32, limit: u32) -> Result<ListEnvelope<T>, EngineError> {
        let total = self.bounded(self.store.count(&self.shape)).await?;
        let offset = (page > 0).then(|| u64::from(page) * u64::from(limit));
        let cap = (limit > 0).then(|| u64::from(limit));
        // Neither backend accepts an OFFSET above i64::MAX, and no row can sit that far in.
        let rows = match offset {
            Some(n) if n > i64::MAX as u64 => Vec::new(),
            _ => self.bounded(self.store.query(&self.shape, offset, cap)).await?,
        };
        let data = rows.into_iter().map(from_row).collect::<Result<Vec<T>, _>>()?;
        Ok(ListEnvelope {
            page,
            limit,
            total,
            data,
        })
    }

    async fn try_update<D: Decoder>(&self, id: u64, decoder: D) -> Result<(), EngineError> {
        let mut record = self.try_read(id).await?;
        decoder.decode(&mut record)?;
        let row = to_row(&record)?;
        self.bounded(self.store.save(&self.shape, id, &row)).await
    }

    async fn bounded<F, R>(&self, call: F) -> Result<R, EngineError>
    where
        F: Future<Output = Result<R, StoreError>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| EngineError::Timeout(limit))?
                .map_err(EngineError::from),
            None => call.await.map_err(EngineError::from),
        }
    }
}

fn report(log: &dyn Logger, err: EngineError) -> Status {
    log.log(&err.to_string());
    err.status()
}

fn to_row<T: Record>(record: &T) -> Result<Row, EngineError> {
    match serde_json::to_value(record).map_err(EngineError::Convert)? {
        serde_json::Value::Object(row) => Ok(row),
        other => Err(EngineError::Convert(serde::ser::Error::custom(format!(
            "record serialized to {} instead of an object",
            other
        )))),
    }
}

fn from_row<T: Record>(row: Row) -> Result<T, EngineError> {
    serde_json::from_value(serde_json::Value::Object(row)).map_err(EngineError::Convert)
}
