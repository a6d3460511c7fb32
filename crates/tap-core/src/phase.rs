//! Phase (Start / End) of a tracked transport operation.

/// Which half of the two-stage marker protocol an event belongs to.
///
/// On the wire this is the tag: `"s:"` for Start, `"e:"` for End.
/// In the event log it is the `is_start` column (`1` / `0`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Phase {
    Start,
    End,
}

impl Phase {
    /// Wire tag that introduces a marker of this phase.
    pub fn tag(self) -> [u8; 2] {
        match self {
            Phase::Start => *b"s:",
            Phase::End => *b"e:",
        }
    }

    pub fn is_start(self) -> bool {
        matches!(self, Phase::Start)
    }

    /// Inverse of [`Phase::is_start`], as read back from a log line.
    pub fn from_is_start(is_start: bool) -> Self {
        if is_start {
            Phase::Start
        } else {
            Phase::End
        }
    }
}
