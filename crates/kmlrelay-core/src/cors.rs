//! The permissive CORS header set the relay attaches to every response, and
//! the OPTIONS preflight answer.

use crate::body::Body;
use crate::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use crate::http::{response_builder, HeaderMap, HeaderValue, Response, StatusCode};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_HEADERS: &str = "Content-Type";
pub const ALLOW_METHODS: &str = "GET, OPTIONS";

/// Insert the relay's CORS triple into `headers`, replacing any prior values.
pub fn apply(headers: &mut HeaderMap) {
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
}

/// The preflight answer: 200, empty body, CORS headers only. No upstream
/// call is made for OPTIONS.
pub fn preflight() -> Response {
    let mut response = response_builder()
        .status(StatusCode::OK)
        .body(Body::empty())
        .expect("static preflight response should not fail");
    apply(response.headers_mut());
    response
}
