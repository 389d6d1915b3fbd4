//! Typed errors for each layer and their mapping onto [`Status`].

use crate::status::Status;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by a [`Store`](crate::store::Store).
#[derive(Error, Debug)]
pub enum StoreError {
    /// No row matches the requested identifier.
    #[error("record not found")]
    NotFound,
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    /// A value could not be converted between its JSON form and its column type.
    #[error("column {column}: {message}")]
    Column { column: String, message: String },
    #[error("invalid record shape: {0}")]
    Shape(String),
}

impl StoreError {
    pub fn column(column: &str, message: impl Into<String>) -> Self {
        StoreError::Column {
            column: column.to_string(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound | StoreError::Db(sqlx::Error::RowNotFound))
    }
}

/// Failures reported by a [`Decoder`](crate::decoder::Decoder).
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    Malformed(serde_json::Error),
    #[error("payload must be a JSON object")]
    NotAnObject,
    /// The record being decoded onto could not be serialized.
    #[error("target record: {0}")]
    Target(serde_json::Error),
    /// The merged payload does not fit the record shape.
    #[error("payload does not match record: {0}")]
    Shape(serde_json::Error),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("decode: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A record could not be converted to or from its row form.
    #[error("record conversion: {0}")]
    Convert(serde_json::Error),
    #[error("store call exceeded {0:?}")]
    Timeout(Duration),
}

impl EngineError {
    pub fn status(&self) -> Status {
        match self {
            EngineError::Decode(_) => Status::BadRequest,
            EngineError::Store(e) if e.is_not_found() => Status::NotFound,
            EngineError::Store(_) | EngineError::Convert(_) | EngineError::Timeout(_) => {
                Status::InternalError
            }
        }
    }
}

/// Invalid environment configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_map_to_not_found() {
        assert_eq!(EngineError::from(StoreError::NotFound).status(), Status::NotFound);
        assert_eq!(
            EngineError::from(StoreError::Db(sqlx::Error::RowNotFound)).status(),
            Status::NotFound
        );
    }

    #[test]
    fn other_failures_map_to_internal_error() {
        assert_eq!(
            EngineError::from(StoreError::Db(sqlx::Error::PoolTimedOut)).status(),
            Status::InternalError
        );
        assert_eq!(
            EngineError::from(StoreError::column("Int", "expected integer")).status(),
            Status::InternalError
        );
        assert_eq!(
            EngineError::Timeout(Duration::from_millis(5)).status(),
            Status::InternalError
        );
    }

    #[test]
    fn decode_failures_map_to_bad_request() {
        assert_eq!(EngineError::from(DecodeError::NotAnObject).status(), Status::BadRequest);
    }
}
