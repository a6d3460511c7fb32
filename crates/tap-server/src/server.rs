//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections, up to `max_clients` at a time.
//! - Assigns each connection a `ClientId`.
//! - Spawns a per-connection task that scans every frame for markers.
//!
//! All connections share one `EventSink`.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tap_sink::EventSink;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::client;
use crate::config::Config;
use crate::types::ClientId;

/// Global-ish counter for assigning unique `ClientId`s.
static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_client_id() -> ClientId {
    let id = NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed);
    ClientId(id)
}

/// Bind the configured address and serve until the listener fails.
pub async fn run(config: Config, sink: Arc<EventSink>) -> Result<()> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("cannot listen on {addr}"))?;
    info!(%addr, policy = %config.policy, "listening");

    serve(listener, config, sink).await
}

/// Accept loop over an already-bound listener.
pub async fn serve(listener: TcpListener, config: Config, sink: Arc<EventSink>) -> Result<()> {
    let active = Arc::new(AtomicUsize::new(0));

    loop {
        let (stream, peer_addr) = listener.accept().await?;

        if active.load(Ordering::Relaxed) >= config.max_clients {
            warn!(
                %peer_addr,
                max_clients = config.max_clients,
                "rejecting connection: max_clients reached"
            );
            // Just drop the stream; peer will see the connection closed.
            continue;
        }

        if let Err(e) = stream.set_nodelay(true) {
            debug!(%peer_addr, error = %e, "set_nodelay failed");
        }

        let client_id = next_client_id();
        active.fetch_add(1, Ordering::Relaxed);
        info!(client = client_id.0, %peer_addr, "accepted connection");

        let sink = sink.clone();
        let active = active.clone();
        let policy = config.policy;
        let max_frame_len = config.max_frame_len;

        tokio::spawn(async move {
            match client::run_client(client_id, stream, sink, policy, max_frame_len).await {
                Ok(stats) => info!(
                    client = client_id.0,
                    frames = stats.frames,
                    markers = stats.markers,
                    bytes = stats.bytes,
                    "client disconnected"
                ),
                Err(e) => warn!(client = client_id.0, error = %e, "client error"),
            }
            active.fetch_sub(1, Ordering::Relaxed);
        });
    }
}
