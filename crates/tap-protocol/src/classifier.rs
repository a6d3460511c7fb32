//! Decides whether an arbitrary transport payload is a marker.
//!
//! Two scanning policies:
//!
//! - [`ScanPolicy::Exact`]: only buffers whose length is exactly a marker
//!   width are considered. Anything else is ordinary payload.
//! - [`ScanPolicy::Repeated`]: for streams where markers may be duplicated
//!   or carried with trailing bytes. Probes the start tag window first,
//!   then the end tag window, regardless of total length.
//!
//! Neither policy allocates. A buffer too short for the window being probed
//! is simply not a marker.

use std::fmt;
use std::str::FromStr;

use tap_core::Event;

use crate::binary_codec::{decode_end_marker, decode_start_marker};
use crate::wire_types::{END_LAYOUT, END_MARKER_LEN, START_LAYOUT, START_MARKER_LEN};

/// Outcome of classifying one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Recognized(Event),
    NotAMarker,
}

impl Classification {
    pub fn is_recognized(&self) -> bool {
        matches!(self, Classification::Recognized(_))
    }

    pub fn event(self) -> Option<Event> {
        match self {
            Classification::Recognized(event) => Some(event),
            Classification::NotAMarker => None,
        }
    }
}

impl From<Option<Event>> for Classification {
    fn from(event: Option<Event>) -> Self {
        match event {
            Some(event) => Classification::Recognized(event),
            None => Classification::NotAMarker,
        }
    }
}

/// How permissively a buffer is scanned for a marker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ScanPolicy {
    Exact,
    #[default]
    Repeated,
}

impl fmt::Display for ScanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPolicy::Exact => write!(f, "exact"),
            ScanPolicy::Repeated => write!(f, "repeated"),
        }
    }
}

/// Error for an unrecognized policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scan policy {0:?} (expected \"exact\" or \"repeated\")")]
pub struct UnknownPolicy(pub String);

impl FromStr for ScanPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(ScanPolicy::Exact),
            "repeated" => Ok(ScanPolicy::Repeated),
            _ => Err(UnknownPolicy(s.to_string())),
        }
    }
}

/// Classify `buf` under `policy`.
pub fn classify(policy: ScanPolicy, buf: &[u8]) -> Classification {
    match policy {
        ScanPolicy::Exact => classify_exact(buf),
        ScanPolicy::Repeated => classify_repeated(buf),
    }
}

/// Exact-size policy: a start marker must be exactly [`START_MARKER_LEN`]
/// bytes, an end marker exactly [`END_MARKER_LEN`].
pub fn classify_exact(buf: &[u8]) -> Classification {
    match buf.len() {
        START_MARKER_LEN => decode_start_marker(buf),
        END_MARKER_LEN => decode_end_marker(buf),
        _ => None,
    }
    .into()
}

/// Repeated policy: probe the start tag at bytes 4..6, then the end tag at
/// bytes 0..2. Trailing bytes past the marker are ignored.
///
/// A buffer whose start probe matches is decoded as a start marker only;
/// it is not retried as an end marker when that decode fails.
pub fn classify_repeated(buf: &[u8]) -> Classification {
    if START_LAYOUT.has_tag(buf) {
        decode_start_marker(buf).into()
    } else if END_LAYOUT.has_tag(buf) {
        decode_end_marker(buf).into()
    } else {
        Classification::NotAMarker
    }
}
