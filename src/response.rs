//! Response values produced by the engine and their HTTP rendering.

use crate::status::Status;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// One page of records. Serialized as `{"Page":…,"Limit":…,"Total":…,"Data":[…]}`.
///
/// `Total` counts every record, ignoring pagination. It is read separately from `Data`, so a
/// concurrent write may leave the two out of step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListEnvelope<T> {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub data: Vec<T>,
}

/// Status plus optional JSON body; the body is written only when present.
pub fn with_value<T: Serialize>(value: Option<T>, status: Status) -> Response {
    match value {
        Some(v) => (status.http(), Json(v)).into_response(),
        None => status.into_response(),
    }
}
