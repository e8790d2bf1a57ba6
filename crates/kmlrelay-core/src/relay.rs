use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;

use crate::body::Body;
use crate::cors;
use crate::error::RelayError;
use crate::http::header::{CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use crate::http::{response_builder, HeaderValue, Method, Request, Response, StatusCode, Uri};
use crate::upstream::{FetchRequest, UpstreamClient};

/// Browser-like agent sent with every outbound fetch; some map/KML hosts
/// reject requests without a recognisable one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
struct RelayQuery {
    #[serde(default)]
    url: Option<String>,
}

/// The CORS relay: one handler invocation per request, stateless apart from
/// the shared upstream client and the configured user agent.
pub struct Relay {
    client: Arc<dyn UpstreamClient>,
    user_agent: HeaderValue,
}

impl Relay {
    pub fn new(client: Arc<dyn UpstreamClient>) -> Self {
        Self::with_user_agent(client, HeaderValue::from_static(DEFAULT_USER_AGENT))
    }

    pub fn with_user_agent(client: Arc<dyn UpstreamClient>, user_agent: HeaderValue) -> Self {
        Self { client, user_agent }
    }

    /// Serve one request. Every path returns a well-formed response carrying
    /// the CORS header set; errors never escape the handler.
    pub async fn handle(&self, request: Request) -> Response {
        if request.method() == Method::OPTIONS {
            return cors::preflight();
        }

        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let start = Instant::now();

        match self.forward(&request).await {
            Ok(response) => {
                let elapsed = start.elapsed().as_secs_f64() * 1000.0;
                tracing::info!(
                    "relay method={} path={} status={} elapsed_ms={:.2}",
                    method,
                    path,
                    response.status().as_u16(),
                    elapsed
                );
                response
            }
            Err(err) => {
                let elapsed = start.elapsed().as_secs_f64() * 1000.0;
                tracing::error!(
                    "relay method={} path={} status={} error={} elapsed_ms={:.2}",
                    method,
                    path,
                    err.status().as_u16(),
                    err.message(),
                    elapsed
                );
                error_response(&err)
            }
        }
    }

    async fn forward(&self, request: &Request) -> Result<Response, RelayError> {
        let target = target_url(request.uri())?;
        tracing::info!("forward target={}", target);

        let mut fetch = FetchRequest::new(target);
        fetch
            .headers_mut()
            .insert(USER_AGENT, self.user_agent.clone());

        let upstream = self.client.fetch(fetch).await?;
        if !upstream.status().is_success() {
            return Err(RelayError::upstream(upstream.status()));
        }

        let (_, headers, body) = upstream.into_parts();
        let content_type = headers
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));

        let mut builder = response_builder()
            .status(StatusCode::OK)
            .header(CONTENT_TYPE, content_type);
        if let Some(length) = headers.get(CONTENT_LENGTH) {
            builder = builder.header(CONTENT_LENGTH, length.clone());
        }

        let mut response = builder
            .body(body)
            .expect("relay response builder should not fail");
        cors::apply(response.headers_mut());
        Ok(response)
    }
}

/// Extract and parse the `url` query parameter. A missing or empty value is
/// the caller's mistake (400); a value that is not a valid URI is reported as
/// a proxy failure (500), matching the relay's catch-all contract.
fn target_url(uri: &Uri) -> Result<Uri, RelayError> {
    let query = uri.query().unwrap_or("");
    let params: RelayQuery =
        serde_urlencoded::from_str(query).map_err(|_| RelayError::MissingParameter)?;
    let url = params
        .url
        .filter(|url| !url.is_empty())
        .ok_or(RelayError::MissingParameter)?;
    url.parse::<Uri>().map_err(RelayError::transport)
}

fn error_response(err: &RelayError) -> Response {
    let text = match err {
        RelayError::MissingParameter => err.message(),
        _ => format!("Proxy error: {}", err.message()),
    };
    let mut response = response_builder()
        .status(err.status())
        .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
        .body(Body::text(text))
        .expect("static error response should not fail");
    cors::apply(response.headers_mut());
    response
}
