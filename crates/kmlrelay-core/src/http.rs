//! HTTP type aliases over the relay [`Body`], re-exported from the `http`
//! crate so the rest of the workspace imports them from one place.

pub use http::header::{self, HeaderMap, HeaderName, HeaderValue};
pub use http::{Method, StatusCode, Uri};

use crate::body::Body;

pub type Request = http::Request<Body>;
pub type Response = http::Response<Body>;

pub fn request_builder() -> http::request::Builder {
    http::request::Builder::new()
}

pub fn response_builder() -> http::response::Builder {
    http::response::Builder::new()
}
