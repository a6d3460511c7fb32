//! Entry points for the transport's receive path.
//!
//! Called once per inbound payload. Classification runs first and is
//! allocation-free; the sink is only touched for recognized markers, so
//! ordinary traffic never opens the log.
//!
//! The return value is advisory: `true` means a marker was recognized and
//! its line queued.

use tap_core::Event;
use tap_protocol::{classify, classify_exact, classify_repeated, Classification, ScanPolicy};
use tracing::info;

use crate::global::global;
use crate::sink::EventSink;

/// Exact-size policy against the process-wide sink.
pub fn try_log_marker_exact(buf: &[u8]) -> bool {
    emit_global(classify_exact(buf))
}

/// Repeated (prefix) policy against the process-wide sink.
pub fn try_log_marker_repeated(buf: &[u8]) -> bool {
    emit_global(classify_repeated(buf))
}

/// Exact-size policy against an explicit sink.
pub fn try_log_marker_exact_with(sink: &EventSink, buf: &[u8]) -> bool {
    emit(sink, classify_exact(buf))
}

/// Repeated (prefix) policy against an explicit sink.
pub fn try_log_marker_repeated_with(sink: &EventSink, buf: &[u8]) -> bool {
    emit(sink, classify_repeated(buf))
}

/// Policy chosen at runtime, against an explicit sink.
pub fn try_log_marker_with(sink: &EventSink, policy: ScanPolicy, buf: &[u8]) -> bool {
    emit(sink, classify(policy, buf))
}

fn emit_global(classification: Classification) -> bool {
    let Classification::Recognized(event) = classification else {
        return false;
    };
    match global() {
        Ok(sink) => log_recognized(sink, &event),
        // already reported once by `global`
        Err(_) => false,
    }
}

fn emit(sink: &EventSink, classification: Classification) -> bool {
    match classification {
        Classification::Recognized(event) => log_recognized(sink, &event),
        Classification::NotAMarker => false,
    }
}

fn log_recognized(sink: &EventSink, event: &Event) -> bool {
    let queued = sink.log_event(event);
    if sink.traces(event.correlation_key) {
        info!(
            key = event.correlation_key,
            phase = ?event.phase,
            sender = event.sender,
            receiver = event.receiver,
            queued,
            "traced correlation key recognized"
        );
    }
    queued
}
