use std::time::Duration;

use async_trait::async_trait;
use kmlrelay_core::body::Body;
use kmlrelay_core::error::RelayError;
use kmlrelay_core::http::{HeaderName, HeaderValue, StatusCode};
use kmlrelay_core::upstream::{FetchRequest, UpstreamClient, UpstreamResponse};
use reqwest::{header, Client};

/// `UpstreamClient` backed by a shared `reqwest::Client`. Response bodies are
/// exposed as a byte stream so the relay forwards them without buffering.
pub struct ReqwestUpstreamClient {
    client: Client,
}

impl ReqwestUpstreamClient {
    /// `timeout` bounds one whole fetch; `None` leaves a hung upstream to
    /// block its single request.
    pub fn new(timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Default for ReqwestUpstreamClient {
    fn default() -> Self {
        Self::new(None).expect("reqwest client")
    }
}

#[async_trait]
impl UpstreamClient for ReqwestUpstreamClient {
    async fn fetch(&self, request: FetchRequest) -> Result<UpstreamResponse, RelayError> {
        let mut builder = self.client.get(request.target().to_string());
        for (name, value) in request.headers().iter() {
            let header_name = header::HeaderName::from_bytes(name.as_str().as_bytes())
                .map_err(RelayError::transport)?;
            let header_value =
                header::HeaderValue::from_bytes(value.as_bytes()).map_err(RelayError::transport)?;
            builder = builder.header(header_name, header_value);
        }

        let response = builder.send().await.map_err(RelayError::transport)?;
        let status =
            StatusCode::from_u16(response.status().as_u16()).map_err(RelayError::transport)?;

        let mut upstream = UpstreamResponse::new(status, Body::empty());
        for (name, value) in response.headers().iter() {
            let header_name = HeaderName::from_bytes(name.as_str().as_bytes())
                .map_err(RelayError::transport)?;
            let header_value =
                HeaderValue::from_bytes(value.as_bytes()).map_err(RelayError::transport)?;
            upstream.headers_mut().insert(header_name, header_value);
        }

        *upstream.body_mut() = Body::from_stream(response.bytes_stream());
        Ok(upstream)
    }
}
