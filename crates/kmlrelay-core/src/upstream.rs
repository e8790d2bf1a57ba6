use std::fmt;

use async_trait::async_trait;

use crate::body::Body;
use crate::error::RelayError;
use crate::http::{HeaderMap, StatusCode, Uri};

/// Outbound fetch description. The relay only ever issues GETs, so a fetch
/// carries a target and headers, nothing else.
pub struct FetchRequest {
    target: Uri,
    headers: HeaderMap,
}

impl FetchRequest {
    pub fn new(target: Uri) -> Self {
        Self {
            target,
            headers: HeaderMap::new(),
        }
    }

    pub fn target(&self) -> &Uri {
        &self.target
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

impl fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchRequest")
            .field("target", &self.target)
            .field("headers", &self.headers)
            .finish()
    }
}

pub struct UpstreamResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, body: Body) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, Body) {
        (self.status, self.headers, self.body)
    }
}

impl fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .finish()
    }
}

/// Seam between the relay handler and whatever performs the outbound GET.
/// A transport-level failure is an `Err`; a non-2xx upstream answer is a
/// normal `UpstreamResponse` and classified by the relay.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<UpstreamResponse, RelayError>;
}
