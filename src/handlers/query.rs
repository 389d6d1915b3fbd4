//! Query-style handlers: one path, the record id travels as `?id=`.
//!
//! GET without an id lists; GET, PUT and DELETE with an id address one record.

use super::{respond_create, respond_delete, respond_list, respond_read, respond_update};
use crate::logger::TracingLogger;
use crate::record::Record;
use crate::routes::Endpoints;
use crate::state::EndpointState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;

type Params = Query<HashMap<String, String>>;

fn id_of(params: &HashMap<String, String>) -> Option<&str> {
    params.get("id").map(String::as_str).filter(|s| !s.is_empty())
}

pub async fn create<T: Record>(State(state): State<EndpointState<T>>, body: Bytes) -> Response {
    let log = TracingLogger::session(format!("POST:{}", state.path));
    respond_create(&state, &log, &body).await
}

pub async fn get<T: Record>(State(state): State<EndpointState<T>>, Query(params): Params) -> Response {
    match id_of(&params) {
        Some(id) if state.endpoints.contains(Endpoints::READ) => {
            let log = TracingLogger::session(format!("GET:{}?id=<id>", state.path));
            respond_read(&state, &log, id).await
        }
        None if state.endpoints.contains(Endpoints::LIST) => {
            let log = TracingLogger::session(format!("GET:{}", state.path));
            respond_list(&state, &log, &params).await
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

pub async fn update<T: Record>(
    State(state): State<EndpointState<T>>,
    Query(params): Params,
    body: Bytes,
) -> Response {
    let log = TracingLogger::session(format!("PUT:{}?id=<id>", state.path));
    respond_update(&state, &log, id_of(&params).unwrap_or_default(), &body).await
}

pub async fn delete<T: Record>(State(state): State<EndpointState<T>>, Query(params): Params) -> Response {
    let log = TracingLogger::session(format!("DELETE:{}?id=<id>", state.path));
    respond_delete(&state, &log, id_of(&params).unwrap_or_default()).await
}
