//! Transport-agnostic outcome of an engine operation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    /// The payload failed to decode.
    BadRequest,
    /// The store has no record with the requested identifier.
    NotFound,
    /// Any other store failure.
    InternalError,
}

impl Status {
    pub fn http(self) -> StatusCode {
        match self {
            Status::Ok => StatusCode::OK,
            Status::BadRequest => StatusCode::BAD_REQUEST,
            Status::NotFound => StatusCode::NOT_FOUND,
            Status::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Ok => "ok",
            Status::BadRequest => "bad_request",
            Status::NotFound => "not_found",
            Status::InternalError => "internal_error",
        };
        f.write_str(s)
    }
}

/// Status alone, with an empty body.
impl IntoResponse for Status {
    fn into_response(self) -> Response {
        self.http().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_codes() {
        assert_eq!(Status::Ok.http(), StatusCode::OK);
        assert_eq!(Status::BadRequest.http(), StatusCode::BAD_REQUEST);
        assert_eq!(Status::NotFound.http(), StatusCode::NOT_FOUND);
        assert_eq!(Status::InternalError.http(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn display() {
        assert_eq!(Status::NotFound.to_string(), "not_found");
    }
}
