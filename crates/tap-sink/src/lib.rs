//! tap-sink
//!
//! Event sink and pipeline entry points for the receive-path tap.
//!
//! The transport calls [`try_log_marker_exact`] or
//! [`try_log_marker_repeated`] once per inbound payload. Recognized
//! markers are formatted as one text line each and handed to a single
//! background writer; the caller never waits on disk I/O.
//!
//! Before exiting, the process calls [`flush_global`] so lines accepted by
//! the shared sink reach the file.

pub mod config;
pub mod error;
pub mod sink;
pub mod global;
pub mod pipeline;

pub use config::SinkConfig;
pub use error::SinkError;
pub use global::{flush_global, global};
pub use pipeline::{
    try_log_marker_exact,
    try_log_marker_exact_with,
    try_log_marker_repeated,
    try_log_marker_repeated_with,
    try_log_marker_with,
};
pub use sink::EventSink;
