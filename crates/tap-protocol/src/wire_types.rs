//! Marker layouts and constants.
//!
//! The layouts are produced by an external sender and must be matched
//! bit for bit. All integers are little-endian.
//!
//! ```text
//! Start marker (24 bytes)
//! -----------------------
//! [0..4]   message_size (i32, must be > 0)
//! [4..6]   tag = "s:"
//! [6]      is_request (0/1)
//! [7]      is_push    (0/1)
//! [8..12]  sender   (i32)
//! [12..16] receiver (i32)
//! [16..24] key      (u64, != u64::MAX)
//!
//! End marker (20 bytes)
//! ---------------------
//! [0..2]   tag = "e:"
//! [2]      is_request (0/1)
//! [3]      is_push    (0/1)
//! [4..8]   sender   (i32)
//! [8..12]  receiver (i32)
//! [12..20] key      (u64, != u64::MAX)
//! ```

use tap_core::Phase;

/// Width of an `int` field on the wire.
pub const INT_LEN: usize = 4;

/// Width of the correlation key on the wire.
pub const KEY_LEN: usize = 8;

/// Width of the ASCII phase tag (`"s:"` / `"e:"`).
pub const TAG_LEN: usize = 2;

/// Reserved all-ones key meaning "unset".
pub const KEY_SENTINEL: u64 = u64::MAX;

/// Byte offsets of every field of one marker kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerLayout {
    pub phase: Phase,

    /// Total marker width in bytes.
    pub len: usize,

    /// Only start markers carry the sender's message size.
    pub size_offset: Option<usize>,

    pub tag_offset: usize,
    pub request_offset: usize,
    pub push_offset: usize,
    pub sender_offset: usize,
    pub receiver_offset: usize,
    pub key_offset: usize,
}

impl MarkerLayout {
    /// The tag bytes this layout expects at `tag_offset`.
    pub fn tag(&self) -> [u8; TAG_LEN] {
        self.phase.tag()
    }

    /// Whether `buf` carries this layout's tag at the tag offset.
    ///
    /// Buffers too short to hold the tag never match.
    #[inline]
    pub fn has_tag(&self, buf: &[u8]) -> bool {
        buf.get(self.tag_offset..self.tag_offset + TAG_LEN) == Some(&self.tag()[..])
    }
}

pub const START_LAYOUT: MarkerLayout = MarkerLayout {
    phase: Phase::Start,
    len: 3 * INT_LEN + 4 + KEY_LEN,
    size_offset: Some(0),
    tag_offset: INT_LEN,
    request_offset: INT_LEN + 2,
    push_offset: INT_LEN + 3,
    sender_offset: INT_LEN + 4,
    receiver_offset: 2 * INT_LEN + 4,
    key_offset: 3 * INT_LEN + 4,
};

pub const END_LAYOUT: MarkerLayout = MarkerLayout {
    phase: Phase::End,
    len: 2 * INT_LEN + 4 + KEY_LEN,
    size_offset: None,
    tag_offset: 0,
    request_offset: 2,
    push_offset: 3,
    sender_offset: 4,
    receiver_offset: INT_LEN + 4,
    key_offset: 2 * INT_LEN + 4,
};

/// Total width of a start marker.
pub const START_MARKER_LEN: usize = START_LAYOUT.len;

/// Total width of an end marker.
pub const END_MARKER_LEN: usize = END_LAYOUT.len;
