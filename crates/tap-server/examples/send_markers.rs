//! Example: act as an instrumented sender.
//!
//! Usage:
//!
//! ```bash
//! # Run the tap
//! cargo run -p tap-server --bin recv-tap
//!
//! # In another terminal, send 5 tracked request/response pairs
//! cargo run -p tap-server --example send_markers -- 5
//! ```
//!
//! For every transaction it sends a start marker, an ordinary payload,
//! and an end marker, each as its own length-prefixed frame.

use std::env;
use std::error::Error;
use std::time::Duration;

use tap_core::Phase;
use tap_protocol::{encode_end_marker, encode_start_marker, Marker};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let count: u64 = env::args()
        .nth(1)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(3);
    let addr = env::var("TAP_CLIENT_ADDR").unwrap_or_else(|_| "127.0.0.1:9100".to_string());

    println!("Connecting to {}", addr);
    let mut stream = TcpStream::connect(&addr).await?;
    println!("Connected.");

    for key in 1..=count {
        let payload = format!("request body #{key}");

        let start = Marker {
            phase: Phase::Start,
            is_request: true,
            is_push: false,
            sender: 1,
            receiver: 2,
            correlation_key: key,
        };
        let mut frame = Vec::with_capacity(64);
        encode_start_marker(&start, payload.len() as i32, &mut frame)?;
        send_frame(&mut stream, &frame).await?;

        send_frame(&mut stream, payload.as_bytes()).await?;
        tokio::time::sleep(Duration::from_millis(5)).await;

        let end = Marker { phase: Phase::End, ..start };
        frame.clear();
        encode_end_marker(&end, &mut frame)?;
        send_frame(&mut stream, &frame).await?;

        println!("--> sent transaction {}", key);
    }

    stream.flush().await?;
    Ok(())
}

async fn send_frame(stream: &mut TcpStream, payload: &[u8]) -> Result<(), Box<dyn Error>> {
    let len = payload.len() as u32;
    stream.write_all(&len.to_be_bytes()).await?;
    stream.write_all(payload).await?;
    Ok(())
}
