//! AutoREST: a generic CRUD engine over a relational store.
//!
//! Register a [`Record`] type against a [`Store`] to get a [`RegisteredType`] exposing
//! create, read, list, update (partial merge) and delete, each reporting a [`Status`].
//! [`routes`] mounts those operations on an axum router.

pub mod config;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod logger;
pub mod record;
pub mod response;
pub mod routes;
pub mod sql;
pub mod state;
pub mod status;
pub mod store;

pub use config::Settings;
pub use decoder::{Decoder, JsonDecoder};
pub use engine::RegisteredType;
pub use error::{ConfigError, DecodeError, EngineError, StoreError};
pub use logger::{Logger, TracingLogger};
pub use record::{Column, ColumnType, Record, RecordShape, ID_COLUMN};
pub use response::ListEnvelope;
pub use routes::{common_routes, path_routes, query_routes, Endpoints};
pub use status::Status;
pub use store::{PgStore, SqliteStore, Store};
