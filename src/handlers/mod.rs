//! HTTP handlers translating requests into engine calls, in two router styles.

pub mod path;
pub mod query;

use crate::decoder::JsonDecoder;
use crate::logger::{Logger, TracingLogger};
use crate::record::Record;
use crate::response::with_value;
use crate::state::EndpointState;
use crate::status::Status;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;

/// Unsigned decimal id; anything else is a bad request.
fn parse_id(log: &dyn Logger, raw: &str) -> Result<u64, Status> {
    parse_digits(raw).ok_or_else(|| {
        log.log(&format!("invalid id '{}'", raw));
        Status::BadRequest
    })
}

fn parse_digits<N: std::str::FromStr>(raw: &str) -> Option<N> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// `page` and `limit` from the query string; missing or empty means 0.
fn parse_pagination(log: &dyn Logger, params: &HashMap<String, String>) -> Result<(u32, u32), Status> {
    let field = |name: &str| -> Result<u32, Status> {
        match params.get(name).map(String::as_str) {
            None | Some("") => Ok(0),
            Some(raw) => parse_digits(raw).ok_or_else(|| {
                log.log(&format!("invalid {} '{}'", name, raw));
                Status::BadRequest
            }),
        }
    };
    Ok((field("page")?, field("limit")?))
}

async fn respond_create<T: Record>(state: &EndpointState<T>, log: &TracingLogger, body: &[u8]) -> Response {
    state.engine.create(log, JsonDecoder::new(body)).await.into_response()
}

async fn respond_read<T: Record>(state: &EndpointState<T>, log: &TracingLogger, raw_id: &str) -> Response {
    let id = match parse_id(log, raw_id) {
        Ok(id) => id,
        Err(status) => return status.into_response(),
    };
    let (record, status) = state.engine.read(log, id).await;
    with_value(record, status)
}

async fn respond_list<T: Record>(
    state: &EndpointState<T>,
    log: &TracingLogger,
    params: &HashMap<String, String>,
) -> Response {
    let (page, limit) = match parse_pagination(log, params) {
        Ok(p) => p,
        Err(status) => return status.into_response(),
    };
    let (envelope, status) = state.engine.list(log, page, limit).await;
    with_value(envelope, status)
}

async fn respond_update<T: Record>(
    state: &EndpointState<T>,
    log: &TracingLogger,
    raw_id: &str,
    body: &[u8],
) -> Response {
    let id = match parse_id(log, raw_id) {
        Ok(id) => id,
        Err(status) => return status.into_response(),
    };
    state.engine.update(log, id, JsonDecoder::new(body)).await.into_response()
}

async fn respond_delete<T: Record>(state: &EndpointState<T>, log: &TracingLogger, raw_id: &str) -> Response {
    let id = match parse_id(log, raw_id) {
        Ok(id) => id,
        Err(status) => return status.into_response(),
    };
    state.engine.delete(log, id).await.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;

    impl Logger for Silent {
        fn log(&self, _message: &str) {}
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn ids_must_be_plain_digits() {
        assert_eq!(parse_id(&Silent, "42"), Ok(42));
        assert_eq!(parse_id(&Silent, "+4"), Err(Status::BadRequest));
        assert_eq!(parse_id(&Silent, "-1"), Err(Status::BadRequest));
        assert_eq!(parse_id(&Silent, "abc"), Err(Status::BadRequest));
        assert_eq!(parse_id(&Silent, ""), Err(Status::BadRequest));
        assert_eq!(parse_id(&Silent, "99999999999999999999999"), Err(Status::BadRequest));
    }

    #[test]
    fn pagination_defaults_to_zero() {
        assert_eq!(parse_pagination(&Silent, &params(&[])), Ok((0, 0)));
        assert_eq!(parse_pagination(&Silent, &params(&[("page", "")])), Ok((0, 0)));
        assert_eq!(
            parse_pagination(&Silent, &params(&[("page", "2"), ("limit", "10")])),
            Ok((2, 10))
        );
    }

    #[test]
    fn malformed_pagination_is_bad_request() {
        assert_eq!(
            parse_pagination(&Silent, &params(&[("limit", "ten")])),
            Err(Status::BadRequest)
        );
        assert_eq!(
            parse_pagination(&Silent, &params(&[("page", "-1")])),
            Err(Status::BadRequest)
        );
    }
}
