use axum::body::Body as AxumBody;
use axum::http::{Request as AxumRequest, Response as AxumResponse};

use kmlrelay_core::body::Body;
use kmlrelay_core::http::{Request as CoreRequest, Response as CoreResponse};

/// Convert an incoming axum request into a core relay request. The relay
/// never reads a request body, so the incoming one is dropped.
pub fn into_core_request(request: AxumRequest<AxumBody>) -> CoreRequest {
    let (parts, _body) = request.into_parts();
    CoreRequest::from_parts(parts, Body::empty())
}

/// Convert a core relay response into an axum response. Streaming bodies
/// stay streaming, so an upstream payload is never collected in memory.
pub fn into_axum_response(response: CoreResponse) -> AxumResponse<AxumBody> {
    let (parts, body) = response.into_parts();
    let body = match body {
        Body::Once(bytes) => AxumBody::from(bytes),
        Body::Stream(stream) => AxumBody::from_stream(stream),
    };
    AxumResponse::from_parts(parts, body)
}
