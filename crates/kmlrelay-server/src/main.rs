use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use log::{info, LevelFilter};

use kmlrelay_core::http::HeaderValue;
use kmlrelay_core::relay::Relay;
use kmlrelay_server::client::ReqwestUpstreamClient;
use kmlrelay_server::config::{RelayConfig, DEFAULT_CONFIG_PATH};
use kmlrelay_server::server::{RelayServer, RelayServerConfig};

fn main() {
    if let Err(err) = run() {
        eprintln!("kmlrelay-server failed: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = RelayConfig::load(Path::new(DEFAULT_CONFIG_PATH))?;

    let level: LevelFilter = config.log_level.into();
    simple_logger::SimpleLogger::new().with_level(level).init().ok();

    let user_agent = HeaderValue::from_str(&config.user_agent)
        .context("user_agent is not a valid header value")?;
    let client =
        ReqwestUpstreamClient::new(config.upstream_timeout()).context("upstream client")?;
    let relay = Relay::with_user_agent(Arc::new(client), user_agent);

    info!("kmlrelay listening on http://{}", config.listen);

    let server_config = RelayServerConfig {
        addr: config.listen,
        enable_ctrl_c: true,
    };
    RelayServer::with_config(relay, server_config)
        .run()
        .context("relay server")
}
