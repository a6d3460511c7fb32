//! Per-connection frame reader.
//!
//! Framing: every frame is a big-endian `u32` length followed by that many
//! payload bytes. Each payload is one transport message and is handed,
//! borrowed, to the marker pipeline.
//!
//! The frame buffer only grows as payload bytes arrive, so a length prefix
//! alone never reserves `max_frame_len`.

use std::io::ErrorKind;
use std::sync::Arc;

use anyhow::{bail, Result};
use bytes::{BufMut, BytesMut};
use tap_protocol::ScanPolicy;
use tap_sink::{try_log_marker_with, EventSink};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tracing::trace;

use crate::types::{ClientId, ClientStats};

/// Upper bound on how much the frame buffer grows per read.
const READ_CHUNK: usize = 64 * 1024;

/// Run the read loop for a single connection until the peer closes it.
pub async fn run_client(
    client_id: ClientId,
    mut stream: TcpStream,
    sink: Arc<EventSink>,
    policy: ScanPolicy,
    max_frame_len: usize,
) -> Result<ClientStats> {
    let mut stats = ClientStats::default();
    let mut frame = BytesMut::with_capacity(4096);

    loop {
        // Read length prefix (u32 BE)
        let frame_len = match stream.read_u32().await {
            Ok(len) => len as usize,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        };

        if frame_len > max_frame_len {
            bail!(
                "client {} sent a {} byte frame (limit {})",
                client_id.0,
                frame_len,
                max_frame_len
            );
        }

        read_frame(&mut stream, &mut frame, frame_len).await?;

        stats.frames += 1;
        stats.bytes += frame_len as u64;

        if try_log_marker_with(&sink, policy, &frame) {
            stats.markers += 1;
            trace!(client = client_id.0, len = frame_len, "marker frame");
        }
    }

    Ok(stats)
}

/// Replace `frame` with exactly `len` bytes from `reader`.
async fn read_frame<R>(reader: &mut R, frame: &mut BytesMut, len: usize) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    frame.clear();
    while frame.len() < len {
        let want = len - frame.len();
        frame.reserve(want.min(READ_CHUNK));
        let n = reader.read_buf(&mut (&mut *frame).limit(want)).await?;
        if n == 0 {
            bail!("connection closed after {} of {} frame bytes", frame.len(), len);
        }
    }
    Ok(())
}
