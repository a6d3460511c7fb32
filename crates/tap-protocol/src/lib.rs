//! tap-protocol
//!
//! Wire-level recognition of the start / end markers an instrumented
//! sender embeds into ordinary transport payloads.
//!
//! - [`wire_types`]  : marker layouts and constants
//! - [`binary_codec`]: field codec, marker decoder / encoder
//! - [`classifier`]  : exact-size and repeated scanning policies
//! - [`text_codec`]  : the event log line format

pub mod wire_types;
pub mod binary_codec;
pub mod classifier;
pub mod text_codec;

pub use binary_codec::{
    decode_end_marker,
    decode_i32,
    decode_start_marker,
    decode_u64,
    encode_end_marker,
    encode_start_marker,
    parse_end_marker,
    parse_start_marker,
    Marker,
    ProtocolError,
    Rejection,
};
pub use classifier::{
    classify,
    classify_exact,
    classify_repeated,
    Classification,
    ScanPolicy,
    UnknownPolicy,
};
pub use text_codec::{format_event_line, parse_event_line};
