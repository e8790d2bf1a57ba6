use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::Router;
use tokio::runtime::Builder as RuntimeBuilder;
use tokio::signal;

use kmlrelay_core::relay::Relay;

use crate::service::{into_axum_response, into_core_request};

/// Configuration used when running the host embedding the relay into axum.
#[derive(Clone)]
pub struct RelayServerConfig {
    pub addr: SocketAddr,
    pub enable_ctrl_c: bool,
}

impl Default for RelayServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8010)),
            enable_ctrl_c: true,
        }
    }
}

/// Blocking server runner. The relay owns every path: requests are not
/// routed, they are all handed to the same handler.
pub struct RelayServer {
    relay: Arc<Relay>,
    config: RelayServerConfig,
}

impl RelayServer {
    pub fn new(relay: Relay) -> Self {
        Self::with_config(relay, RelayServerConfig::default())
    }

    pub fn with_config(relay: Relay, config: RelayServerConfig) -> Self {
        Self {
            relay: Arc::new(relay),
            config,
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let runtime = RuntimeBuilder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to build tokio runtime")?;

        runtime.block_on(async move { self.run_async().await })
    }

    async fn run_async(self) -> anyhow::Result<()> {
        // Bind the std listener first so address errors surface before the
        // server future is spawned.
        let listener = StdTcpListener::bind(self.config.addr)
            .with_context(|| format!("failed to bind relay server to {}", self.config.addr))?;
        listener
            .set_nonblocking(true)
            .context("failed to set listener to non-blocking")?;

        let listener = tokio::net::TcpListener::from_std(listener)
            .context("failed to adopt std listener into tokio")?;

        self.serve_on(listener).await
    }

    /// Serve on an already-bound listener. Useful for embedding and for
    /// tests that bind port zero themselves.
    pub async fn serve_on(self, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
        let RelayServer { relay, config } = self;

        let app = Router::new().fallback(relay_entry).with_state(relay);

        let server = axum::serve(listener, app);
        if config.enable_ctrl_c {
            let shutdown = async {
                let _ = signal::ctrl_c().await;
            };
            server
                .with_graceful_shutdown(shutdown)
                .await
                .context("axum server error")?;
        } else {
            server.await.context("axum server error")?;
        }

        Ok(())
    }
}

async fn relay_entry(
    State(relay): State<Arc<Relay>>,
    request: axum::extract::Request,
) -> axum::response::Response {
    into_axum_response(relay.handle(into_core_request(request)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    use kmlrelay_core::upstream::{FetchRequest, UpstreamClient, UpstreamResponse};
    use kmlrelay_core::{body::Body, error::RelayError, http::StatusCode};

    struct NullClient;

    #[async_trait::async_trait]
    impl UpstreamClient for NullClient {
        async fn fetch(&self, _request: FetchRequest) -> Result<UpstreamResponse, RelayError> {
            Ok(UpstreamResponse::new(StatusCode::OK, Body::empty()))
        }
    }

    #[test]
    fn default_config_uses_expected_address() {
        let config = RelayServerConfig::default();
        assert_eq!(config.addr.ip(), IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)));
        assert_eq!(config.addr.port(), 8010);
        assert!(config.enable_ctrl_c);
    }

    #[test]
    fn with_config_overrides_defaults() {
        let config = RelayServerConfig {
            addr: SocketAddr::from(([0, 0, 0, 0], 9000)),
            enable_ctrl_c: false,
        };
        let server = RelayServer::with_config(Relay::new(Arc::new(NullClient)), config);
        assert_eq!(server.config.addr.port(), 9000);
        assert!(!server.config.enable_ctrl_c);
    }

    #[test]
    fn new_uses_default_config() {
        let server = RelayServer::new(Relay::new(Arc::new(NullClient)));
        assert_eq!(server.config.addr.port(), 8010);
    }
}
