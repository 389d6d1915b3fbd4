//! Path-style handlers: the record id is the last path segment (`P/{id}`).

use super::{respond_create, respond_delete, respond_list, respond_read, respond_update};
use crate::logger::TracingLogger;
use crate::record::Record;
use crate::state::EndpointState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::Response,
};
use std::collections::HashMap;

/// POST `P` with a full record.
pub async fn create<T: Record>(State(state): State<EndpointState<T>>, body: Bytes) -> Response {
    let log = TracingLogger::session(format!("POST:{}", state.path));
    respond_create(&state, &log, &body).await
}

/// GET `P/{id}`
pub async fn read<T: Record>(State(state): State<EndpointState<T>>, Path(id): Path<String>) -> Response {
    let log = TracingLogger::session(format!("GET:{}/<id>", state.path));
    respond_read(&state, &log, &id).await
}

/// GET `P?page=&limit=`
pub async fn list<T: Record>(
    State(state): State<EndpointState<T>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let log = TracingLogger::session(format!("GET:{}", state.path));
    respond_list(&state, &log, &params).await
}

/// PUT `P/{id}` with a partial record.
pub async fn update<T: Record>(
    State(state): State<EndpointState<T>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let log = TracingLogger::session(format!("PUT:{}/<id>", state.path));
    respond_update(&state, &log, &id, &body).await
}

/// DELETE `P/{id}`
pub async fn delete<T: Record>(State(state): State<EndpointState<T>>, Path(id): Path<String>) -> Response {
    let log = TracingLogger::session(format!("DELETE:{}/<id>", state.path));
    respond_delete(&state, &log, &id).await
}
