//! tap-server
//!
//! Receive-path harness for the marker tap: a TCP listener whose
//! connections carry length-prefixed frames, each of which is scanned for
//! markers and logged through a shared [`tap_sink::EventSink`].
//!
//! Also hosts the offline latency report used by the `tap-report` binary.

pub mod config;
pub mod types;
pub mod server;
pub mod report;

// internal, not re-exported
mod client;
