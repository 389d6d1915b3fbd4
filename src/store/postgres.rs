//! PostgreSQL store on a `sqlx` pool.

use super::{Row, Store};
use crate::error::StoreError;
use crate::record::{ColumnType, RecordShape, ID_COLUMN};
use crate::sql::{self, BindValue, Dialect};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{ConnectOptions, Postgres, Row as _};
use std::str::FromStr;

const DIALECT: Dialect = Dialect::Postgres;

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn bind(q: Query<'_, Postgres, PgArguments>, v: BindValue) -> Query<'_, Postgres, PgArguments> {
    match v {
        BindValue::Null(ColumnType::Integer) => q.bind(None::<i64>),
        BindValue::Null(ColumnType::Real) => q.bind(None::<f64>),
        BindValue::Null(ColumnType::Text) => q.bind(None::<String>),
        BindValue::Null(ColumnType::Boolean) => q.bind(None::<bool>),
        BindValue::Null(ColumnType::Json) => q.bind(None::<Value>),
        BindValue::Bool(b) => q.bind(b),
        BindValue::I64(n) => q.bind(n),
        BindValue::F64(n) => q.bind(n),
        BindValue::String(s) => q.bind(s),
        BindValue::Json(v) => q.bind(v),
    }
}

fn row_to_json(shape: &RecordShape, row: &PgRow) -> Result<Row, StoreError> {
    let mut map = Row::new();
    let id: i64 = row.try_get(ID_COLUMN)?;
    map.insert(ID_COLUMN.to_string(), Value::from(id));
    for c in shape.columns {
        let v = match c.kind {
            ColumnType::Integer => row.try_get::<Option<i64>, _>(c.name)?.map(Value::from),
            ColumnType::Real => row.try_get::<Option<f64>, _>(c.name)?.map(Value::from),
            ColumnType::Text => row.try_get::<Option<String>, _>(c.name)?.map(Value::from),
            ColumnType::Boolean => row.try_get::<Option<bool>, _>(c.name)?.map(Value::from),
            ColumnType::Json => row.try_get::<Option<Value>, _>(c.name)?,
        };
        map.insert(c.name.to_string(), v.unwrap_or(Value::Null));
    }
    Ok(map)
}

#[async_trait]
impl Store for PgStore {
    async fn migrate(&self, shape: &RecordShape) -> Result<(), StoreError> {
        let ddl = sql::create_table(DIALECT, shape);
        tracing::debug!(sql = %ddl, "migrate");
        sqlx::query(&ddl).execute(&self.pool).await?;
        for c in shape.columns {
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

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

/// Split `postgres://user@host:port/db?opts` into (admin url on `postgres`, db name).
fn parse_db_name_from_url(url: &str) -> Result<(String, String), StoreError> {
    let no_path = || StoreError::Db(sqlx::Error::Configuration("DATABASE_URL: no path".into()));
    let authority_start = url.find("://").map(|i| i + 3).ok_or_else(no_path)?;
    let path_start = url
        .get(authority_start..)
        .and_then(|rest| rest.find('/'))
        .map(|i| authority_start + i + 1)
        .ok_or_else(no_path)?;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let (db_name, query) = match path_and_query.split_once('?') {
        Some((db, q)) => (db.trim(), Some(q)),
        None => (path_and_query.trim(), None),
    };
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = match query {
        Some(q) => format!("{}postgres?{}", base, q),
        None => format!("{}postgres", base),
    };
    Ok((admin_url, db_name.to_string()))
}
