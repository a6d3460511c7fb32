//! Process-wide event sink.
//!
//! Created on first use from [`SinkConfig::from_env`] and kept for the
//! life of the process. Concurrent first use is race-free: exactly one
//! caller runs initialization, the rest wait for its outcome.
//!
//! A failed initialization is remembered. It is reported once through
//! `tracing` and every later caller gets the same error back.
//!
//! Statics are never dropped, so the writer is not stopped at exit. A
//! process embedding the tap calls [`flush_global`] before it exits;
//! otherwise lines still buffered since the last periodic flush are lost.

use std::sync::OnceLock;

use tracing::error;

use crate::config::SinkConfig;
use crate::error::SinkError;
use crate::sink::EventSink;

static GLOBAL_SINK: OnceLock<Result<EventSink, SinkError>> = OnceLock::new();

/// The shared sink, opening it on first call.
pub fn global() -> Result<&'static EventSink, &'static SinkError> {
    GLOBAL_SINK
        .get_or_init(|| {
            let opened = SinkConfig::from_env().and_then(|config| EventSink::open(&config));
            if let Err(e) = &opened {
                error!(error = %e, "event sink unavailable; recognized markers will not be logged");
            }
            opened
        })
        .as_ref()
}

/// Write out and flush every line queued on the shared sink so far.
///
/// Call it before a normal process exit. Does nothing, and returns `true`,
/// when the sink was never opened. Returns `false` when it could not be
/// opened or the flush failed. Blocks; see [`EventSink::flush`].
pub fn flush_global() -> bool {
    match GLOBAL_SINK.get() {
        None => true,
        Some(Ok(sink)) => sink.flush(),
        Some(Err(_)) => false,
    }
}
