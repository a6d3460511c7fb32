//! Receive-path marker tap over TCP.

use std::sync::Arc;

use anyhow::Result;
use tap_server::config::Config;
use tap_server::server;
use tap_sink::{EventSink, SinkConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let sink_config = SinkConfig::from_env()?;
    let sink = Arc::new(EventSink::open(&sink_config)?);

    info!(
        addr = %config.socket_addr_string(),
        policy = %config.policy,
        max_clients = config.max_clients,
        log = %sink_config.log_path.display(),
        "starting recv-tap"
    );
    sink.log_text(&format!(
        "# recv-tap listening on {} policy={}",
        config.socket_addr_string(),
        config.policy
    ));

    tokio::select! {
        result = server::run(config, sink.clone()) => result?,
        _ = tokio::signal::ctrl_c() => info!("interrupted, shutting down"),
    }

    match Arc::try_unwrap(sink) {
        Ok(sink) => sink.shutdown(),
        Err(sink) => warn!(
            dropped = sink.dropped(),
            "connections still open; unflushed event lines may be lost"
        ),
    }

    Ok(())
}
