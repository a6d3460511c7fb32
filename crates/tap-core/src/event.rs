//! The unit of record written to the event log.
//!
//! An [`Event`] is produced when a transport payload is recognized as a
//! start or end marker. It is a plain value: created by the decoder,
//! handed once to the sink, and never kept afterwards.

use crate::phase::Phase;

/// One recognized marker, stamped with the time it was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Start or end of the tracked operation.
    pub phase: Phase,

    /// Whether the tracked operation is a push (vs. a pull).
    pub is_push: bool,

    /// Whether the tracked message is a request (vs. a response).
    pub is_request: bool,

    /// Application-assigned key linking a start marker to its end marker.
    pub correlation_key: u64,

    /// Sender id as written by the instrumented peer. Not range-checked.
    pub sender: i32,

    /// Receiver id as written by the instrumented peer. Not range-checked.
    pub receiver: i32,

    /// Microseconds since the Unix epoch.
    pub observed_at: i64,
}

impl Event {
    pub fn is_start(&self) -> bool {
        self.phase.is_start()
    }
}
