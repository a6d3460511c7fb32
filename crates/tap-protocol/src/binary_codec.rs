//! Binary field codec and marker decoding/encoding.
//!
//! This module converts between:
//! - raw transport payloads (`&[u8]`)
//! - [`Marker`] / [`tap_core::Event`] values
//!
//! See [`crate::wire_types`] for the byte layouts.
//!
//! NOTE: the two integer readers intentionally differ. `decode_i32` widens
//! every byte as a *signed* 8-bit value before shifting, so a byte with the
//! high bit set contributes a negative partial sum. `decode_u64` widens
//! every byte unsigned. Instrumented senders already depend on the exact
//! values this produces (e.g. `message_size > 0`), so both are kept.

use tap_core::{now_micros, Event, Phase};
use thiserror::Error;

use crate::wire_types::{MarkerLayout, END_LAYOUT, INT_LEN, KEY_LEN, KEY_SENTINEL, START_LAYOUT};

/// Errors that can arise when reading or writing a marker buffer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer too short for the field being read.
    #[error("buffer truncated: need {need} bytes, got {got}")]
    Truncated { need: usize, got: usize },

    /// A value cannot be represented in a marker.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),
}

/// Why a buffer is not a marker of the layout it was decoded against.
///
/// This is the expected outcome for ordinary payloads, not an error.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error(transparent)]
    Malformed(#[from] ProtocolError),

    #[error("marker tag not present")]
    TagMismatch,

    #[error("non-positive message size {0}")]
    NonPositiveSize(i32),

    #[error("{field} flag out of range: {value}")]
    FlagOutOfRange { field: &'static str, value: u8 },

    #[error("correlation key is the unset sentinel")]
    SentinelKey,
}

/// Decoded marker fields, before a timestamp is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub phase: Phase,
    pub is_request: bool,
    pub is_push: bool,
    pub sender: i32,
    pub receiver: i32,
    pub correlation_key: u64,
}

impl Marker {
    /// Stamp the marker with the time it was observed.
    pub fn observe(self, observed_at: i64) -> Event {
        Event {
            phase: self.phase,
            is_push: self.is_push,
            is_request: self.is_request,
            correlation_key: self.correlation_key,
            sender: self.sender,
            receiver: self.receiver,
            observed_at,
        }
    }
}

// ============================================================================
// Field codec
// ============================================================================

/// Read a 4-byte little-endian integer at `offset`, widening each byte as
/// a signed 8-bit value.
pub fn decode_i32(buf: &[u8], offset: usize) -> Result<i32, ProtocolError> {
    let bytes = field(buf, offset, INT_LEN)?;
    Ok(bytes.iter().enumerate().fold(0i32, |acc, (i, &b)| {
        acc.wrapping_add((b as i8 as i32).wrapping_shl(8 * i as u32))
    }))
}

/// Read an 8-byte little-endian integer at `offset`, widening each byte
/// unsigned.
pub fn decode_u64(buf: &[u8], offset: usize) -> Result<u64, ProtocolError> {
    let bytes = field(buf, offset, KEY_LEN)?;
    Ok(bytes
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | ((b as u64) << (8 * i))))
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a start marker, or say why `buf` is not one.
pub fn parse_start_marker(buf: &[u8]) -> Result<Marker, Rejection> {
    parse_marker(&START_LAYOUT, buf)
}

/// Decode an end marker, or say why `buf` is not one.
pub fn parse_end_marker(buf: &[u8]) -> Result<Marker, Rejection> {
    parse_marker(&END_LAYOUT, buf)
}

/// Decode a start marker and stamp it with the current time.
pub fn decode_start_marker(buf: &[u8]) -> Option<Event> {
    parse_start_marker(buf).ok().map(|m| m.observe(now_micros()))
}

/// Decode an end marker and stamp it with the current time.
pub fn decode_end_marker(buf: &[u8]) -> Option<Event> {
    parse_end_marker(buf).ok().map(|m| m.observe(now_micros()))
}

fn parse_marker(layout: &MarkerLayout, buf: &[u8]) -> Result<Marker, Rejection> {
    if buf.len() < layout.len {
        return Err(ProtocolError::Truncated {
            need: layout.len,
            got: buf.len(),
        }
        .into());
    }

    if !layout.has_tag(buf) {
        return Err(Rejection::TagMismatch);
    }

    if let Some(offset) = layout.size_offset {
        let message_size = decode_i32(buf, offset)?;
        if message_size <= 0 {
            return Err(Rejection::NonPositiveSize(message_size));
        }
    }

    let is_request = decode_flag(buf, layout.request_offset, "is_request")?;
    let is_push = decode_flag(buf, layout.push_offset, "is_push")?;

    let sender = decode_i32(buf, layout.sender_offset)?;
    let receiver = decode_i32(buf, layout.receiver_offset)?;

    let correlation_key = decode_u64(buf, layout.key_offset)?;
    if correlation_key == KEY_SENTINEL {
        return Err(Rejection::SentinelKey);
    }

    Ok(Marker {
        phase: layout.phase,
        is_request,
        is_push,
        sender,
        receiver,
        correlation_key,
    })
}

fn decode_flag(buf: &[u8], offset: usize, name: &'static str) -> Result<bool, Rejection> {
    let value = field(buf, offset, 1)?[0];
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(Rejection::FlagOutOfRange { field: name, value }),
    }
}

// ============================================================================
// Encoding (instrumented sender side)
// ============================================================================

/// Encode a start marker. The encoded bytes are appended to `out`.
///
/// Integers are written plain little-endian. Values with a byte whose high
/// bit is set will not read back identically through [`decode_i32`].
pub fn encode_start_marker(
    marker: &Marker,
    message_size: i32,
    out: &mut Vec<u8>,
) -> Result<(), ProtocolError> {
    if marker.phase != Phase::Start {
        return Err(ProtocolError::InvalidField("phase"));
    }
    if message_size <= 0 {
        return Err(ProtocolError::InvalidField("message_size"));
    }
    check_key(marker)?;

    out.extend_from_slice(&message_size.to_le_bytes());
    encode_body(marker, out)
}

/// Encode an end marker. The encoded bytes are appended to `out`.
pub fn encode_end_marker(marker: &Marker, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    if marker.phase != Phase::End {
        return Err(ProtocolError::InvalidField("phase"));
    }
    check_key(marker)?;
    encode_body(marker, out)
}

fn check_key(marker: &Marker) -> Result<(), ProtocolError> {
    if marker.correlation_key == KEY_SENTINEL {
        return Err(ProtocolError::InvalidField("correlation_key"));
    }
    Ok(())
}

// tag, flags, sender, receiver, key: shared tail of both layouts
fn encode_body(marker: &Marker, out: &mut Vec<u8>) -> Result<(), ProtocolError> {
    out.extend_from_slice(&marker.phase.tag());
    out.push(marker.is_request as u8);
    out.push(marker.is_push as u8);
    out.extend_from_slice(&marker.sender.to_le_bytes());
    out.extend_from_slice(&marker.receiver.to_le_bytes());
    out.extend_from_slice(&marker.correlation_key.to_le_bytes());

    Ok(())
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn field(buf: &[u8], offset: usize, width: usize) -> Result<&[u8], ProtocolError> {
    let need = offset.saturating_add(width);
    buf.get(offset..need).ok_or(ProtocolError::Truncated {
        need,
        got: buf.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire_types::{END_MARKER_LEN, START_MARKER_LEN};

    fn start_marker() -> Marker {
        Marker {
            phase: Phase::Start,
            is_request: true,
            is_push: false,
            sender: 7,
            receiver: 9,
            correlation_key: 42,
        }
    }

    fn encoded_start() -> Vec<u8> {
        let mut buf = Vec::new();
        encode_start_marker(&start_marker(), 1, &mut buf).unwrap();
        buf
    }

    #[test]
    fn high_bit_byte_is_negative_for_i32_and_positive_for_u64() {
        let buf = [0x80u8, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(decode_i32(&buf, 0).unwrap(), -128);
        assert_eq!(decode_u64(&buf, 0).unwrap(), 128);
    }

    #[test]
    fn all_ones_bytes_decode_asymmetrically() {
        let buf = [0xFFu8; 8];
        // -1 - 256 - 65536 - 16777216
        assert_eq!(decode_i32(&buf, 0).unwrap(), -16_843_009);
        assert_eq!(decode_u64(&buf, 0).unwrap(), u64::MAX);
    }

    #[test]
    fn high_bit_in_upper_byte_of_i32() {
        // 0x01 + (-128 << 8) = 1 - 32768
        assert_eq!(decode_i32(&[0x01, 0x80, 0, 0], 0).unwrap(), -32_767);
        // plain values are unaffected
        assert_eq!(decode_i32(&[0x2A, 0x01, 0, 0], 0).unwrap(), 298);
    }

    #[test]
    fn u64_high_byte_contributes_full_weight() {
        let mut buf = [0u8; 8];
        buf[7] = 0xFF;
        assert_eq!(decode_u64(&buf, 0).unwrap(), 255u64 << 56);
    }

    #[test]
    fn out_of_range_reads_are_truncated_errors() {
        assert_eq!(
            decode_i32(&[1, 2, 3], 0),
            Err(ProtocolError::Truncated { need: 4, got: 3 })
        );
        assert_eq!(
            decode_u64(&[0; 10], 4),
            Err(ProtocolError::Truncated { need: 12, got: 10 })
        );
        assert!(decode_i32(&[0; 4], usize::MAX).is_err());
    }

    #[test]
    fn start_marker_decodes_fields() {
        let buf = encoded_start();
        assert_eq!(buf.len(), START_MARKER_LEN);
        assert_eq!(parse_start_marker(&buf), Ok(start_marker()));

        let event = decode_start_marker(&buf).unwrap();
        assert_eq!(event.phase, Phase::Start);
        assert!(event.is_request);
        assert!(!event.is_push);
        assert_eq!((event.correlation_key, event.sender, event.receiver), (42, 7, 9));
        assert!(event.observed_at > 0);
    }

    #[test]
    fn end_marker_decodes_fields() {
        let marker = Marker {
            phase: Phase::End,
            is_request: false,
            is_push: true,
            sender: 3,
            receiver: 4,
            correlation_key: 1 << 40,
        };
        let mut buf = Vec::new();
        encode_end_marker(&marker, &mut buf).unwrap();
        assert_eq!(buf.len(), END_MARKER_LEN);
        assert_eq!(parse_end_marker(&buf), Ok(marker));
    }

    #[test]
    fn start_rejects_non_positive_size() {
        let mut buf = encoded_start();
        buf[0..4].copy_from_slice(&0i32.to_le_bytes());
        assert_eq!(parse_start_marker(&buf), Err(Rejection::NonPositiveSize(0)));

        // 128 on the wire reads as -128 through the signed widening
        buf[0..4].copy_from_slice(&[0x80, 0, 0, 0]);
        assert_eq!(parse_start_marker(&buf), Err(Rejection::NonPositiveSize(-128)));
    }

    #[test]
    fn start_rejects_flags_out_of_range() {
        let mut buf = encoded_start();
        buf[6] = 2;
        assert_eq!(
            parse_start_marker(&buf),
            Err(Rejection::FlagOutOfRange { field: "is_request", value: 2 })
        );

        let mut buf = encoded_start();
        buf[7] = 0xFF;
        assert!(matches!(
            parse_start_marker(&buf),
            Err(Rejection::FlagOutOfRange { field: "is_push", .. })
        ));
    }

    #[test]
    fn sentinel_key_rejected_by_both_decoders() {
        let mut start = encoded_start();
        start[16..24].copy_from_slice(&[0xFF; 8]);
        assert_eq!(parse_start_marker(&start), Err(Rejection::SentinelKey));

        let mut end = Vec::new();
        let marker = Marker { phase: Phase::End, ..start_marker() };
        encode_end_marker(&marker, &mut end).unwrap();
        end[12..20].copy_from_slice(&[0xFF; 8]);
        assert_eq!(parse_end_marker(&end), Err(Rejection::SentinelKey));
    }

    #[test]
    fn sender_and_receiver_are_not_range_checked() {
        let mut buf = encoded_start();
        buf[8..12].copy_from_slice(&[0xFF; 4]);
        buf[12..16].copy_from_slice(&[0x00, 0x00, 0x00, 0x80]);
        let marker = parse_start_marker(&buf).unwrap();
        assert_eq!(marker.sender, -16_843_009);
        assert_eq!(marker.receiver, i32::MIN);
    }

    #[test]
    fn wrong_tag_and_short_buffers_are_rejected() {
        let mut buf = encoded_start();
        buf[4] = b'e';
        assert_eq!(parse_start_marker(&buf), Err(Rejection::TagMismatch));

        let short = &encoded_start()[..START_MARKER_LEN - 1];
        assert!(matches!(
            parse_start_marker(short),
            Err(Rejection::Malformed(ProtocolError::Truncated { .. }))
        ));
    }

    #[test]
    fn encoder_refuses_unrepresentable_markers() {
        let mut out = Vec::new();
        assert_eq!(
            encode_start_marker(&start_marker(), 0, &mut out),
            Err(ProtocolError::InvalidField("message_size"))
        );
        assert_eq!(
            encode_end_marker(&start_marker(), &mut out),
            Err(ProtocolError::InvalidField("phase"))
        );
        let sentinel = Marker { correlation_key: KEY_SENTINEL, ..start_marker() };
        assert_eq!(
            encode_start_marker(&sentinel, 1, &mut out),
            Err(ProtocolError::InvalidField("correlation_key"))
        );
        assert!(out.is_empty());
    }
}
