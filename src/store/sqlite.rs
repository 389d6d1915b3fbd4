//! SQLite store on a `sqlx` pool. Used for embedded deployments and tests.

use super::{Row, Store};
use crate::error::StoreError;
use crate::record::{ColumnType, RecordShape, ID_COLUMN};
use crate::sql::{self, BindValue, Dialect};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row as _, Sqlite};
use std::collections::HashSet;
use std::str::FromStr;

const DIALECT: Dialect = Dialect::Sqlite;

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }

    /// Open (creating if missing) the database at `database_url`, e.g. `sqlite://data.db`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        if database_url.contains(":memory:") {
            return Self::in_memory().await;
        }
        let opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;
        Ok(Self::new(pool))
    }

    /// Private in-memory database. Every connection to `:memory:` is a separate database,
    /// so the pool holds exactly one connection and never recycles it.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;
        Ok(Self::new(pool))
    }
}

fn bind<'q>(q: Query<'q, Sqlite, SqliteArguments<'q>>, v: BindValue) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match v {
        BindValue::Null(ColumnType::Integer) => q.bind(None::<i64>),
        BindValue::Null(ColumnType::Real) => q.bind(None::<f64>),
        BindValue::Null(ColumnType::Text | ColumnType::Json) => q.bind(None::<String>),
        BindValue::Null(ColumnType::Boolean) => q.bind(None::<bool>),
        BindValue::Bool(b) => q.bind(b),
        BindValue::I64(n) => q.bind(n),
        BindValue::F64(n) => q.bind(n),
        BindValue::String(s) => q.bind(s),
        BindValue::Json(v) => q.bind(v.to_string()),
    }
}

fn row_to_json(shape: &RecordShape, row: &SqliteRow) -> Result<Row, StoreError> {
    let mut map = Row::new();
    let id: i64 = row.try_get(ID_COLUMN)?;
    map.insert(ID_COLUMN.to_string(), Value::from(id));
    for c in shape.columns {
        let v = match c.kind {
            ColumnType::Integer => row.try_get::<Option<i64>, _>(c.name)?.map(Value::from),
            ColumnType::Real => row.try_get::<Option<f64>, _>(c.name)?.map(Value::from),
            ColumnType::Text => row.try_get::<Option<String>, _>(c.name)?.map(Value::from),
            ColumnType::Boolean => row.try_get::<Option<bool>, _>(c.name)?.map(Value::from),
            ColumnType::Json => match row.try_get::<Option<String>, _>(c.name)? {
                Some(text) => Some(
                    serde_json::from_str(&text)
                        .map_err(|e| StoreError::column(c.name, e.to_string()))?,
                ),
                None => None,
            },
        };
        map.insert(c.name.to_string(), v.unwrap_or(Value::Null));
    }
    Ok(map)
}

#[async_trait]
impl Store for SqliteStore {
    async fn migrate(&self, shape: &RecordShape) -> Result<(), StoreError> {
        let ddl = sql::create_table(DIALECT, shape);
        tracing::debug!(sql = %ddl, "migrate");
        sqlx::query(&ddl).execute(&self.pool).await?;

        let existing: HashSet<String> = sqlx::query_scalar::<_, String>(sql::existing_columns())
            .bind(shape.table)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        for c in shape.columns {
            if existing.contains(&c.name.to_ascii_lowercase()) {
                continue;
            }
            let alter = sql::add_column(DIALECT, shape, c);
            tracing::debug!(sql = %alter, "migrate");
            sqlx::query(&alter).execute(&self.pool).await?;
        }
        tracing::info!(table = shape.table, "schema migrated");
        Ok(())
    }

    async fn insert(&self, shape: &RecordShape, row: &Row) -> Result<u64, StoreError> {
        let sql = sql::insert(DIALECT, shape);
        let params = sql::row_params(shape, row)?;
        tracing::debug!(sql = %sql, params = ?params, "query");
        let mut q = sqlx::query(&sql);
        for p in params {
            q = bind(q, p);
        }
        let created = q.fetch_one(&self.pool).await?;
        let id: i64 = created.try_get(ID_COLUMN)?;
        u64::try_from(id).map_err(|_| StoreError::column(ID_COLUMN, format!("negative id {}", id)))
    }

    async fn first_by_id(&self, shape: &RecordShape, id: u64) -> Result<Row, StoreError> {
        let id = sql::id_param(id)?;
        let sql = sql::select_by_id(DIALECT, shape);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        row_to_json(shape, &row)
    }

    async fn count(&self, shape: &RecordShape) -> Result<i64, StoreError> {
        let sql = sql::count(shape);
        tracing::debug!(sql = %sql, "query");
        let n = sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool).await?;
        Ok(n)
    }

    async fn query(
        &self,
        shape: &RecordShape,
        offset: Option<u64>,
        limit: Option<u64>,
    ) -> Result<Vec<Row>, StoreError> {
        let sql = sql::select_page(DIALECT, shape, offset, limit);
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(|r| row_to_json(shape, r)).collect()
    }

    async fn save(&self, shape: &RecordShape, id: u64, row: &Row) -> Result<(), StoreError> {
        let id = sql::id_param(id)?;
        let sql = sql::update_by_id(DIALECT, shape);
        let params = sql::row_params(shape, row)?;
        tracing::debug!(sql = %sql, params = ?params, id, "query");
        let mut q = sqlx::query(&sql);
        for p in params {
            q = bind(q, p);
        }
        let done = q.bind(id).execute(&self.pool).await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, shape: &RecordShape, id: u64) -> Result<(), StoreError> {
        let id = sql::id_param(id)?;
        let sql = sql::delete_by_id(DIALECT, shape);
        tracing::debug!(sql = %sql, id, "query");
        let done = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
