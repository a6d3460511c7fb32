//! Event log line format.
//!
//! One record per line, fields separated by a single space:
//!
//! ```text
//! <observed_at_us> <is_start 0|1> <is_push 0|1> <is_request 0|1> <key> <sender> <receiver>
//! ```
//!
//! Free-text diagnostic lines share the file and have no schema;
//! [`parse_event_line`] returns `None` for them.

use std::fmt::Write;

use tap_core::{Event, Phase};

/// Format an event as a log line, without the trailing newline.
pub fn format_event_line(event: &Event) -> String {
    let mut line = String::with_capacity(64);
    // Writing into a String cannot fail.
    let _ = write!(
        line,
        "{} {} {} {} {} {} {}",
        event.observed_at,
        flag(event.is_start()),
        flag(event.is_push),
        flag(event.is_request),
        event.correlation_key,
        event.sender,
        event.receiver
    );
    line
}

/// Parse a log line back into an event.
///
/// Returns `None` for blank lines, free-text lines, and anything that
/// does not have exactly the seven expected fields.
pub fn parse_event_line(line: &str) -> Option<Event> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 7 {
        return None;
    }

    let observed_at = tokens[0].parse::<i64>().ok()?;
    let is_start = parse_flag(tokens[1])?;
    let is_push = parse_flag(tokens[2])?;
    let is_request = parse_flag(tokens[3])?;
    let correlation_key = tokens[4].parse::<u64>().ok()?;
    let sender = tokens[5].parse::<i32>().ok()?;
    let receiver = tokens[6].parse::<i32>().ok()?;

    Some(Event {
        phase: Phase::from_is_start(is_start),
        is_push,
        is_request,
        correlation_key,
        sender,
        receiver,
        observed_at,
    })
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

fn flag(b: bool) -> u8 {
    b as u8
}

fn parse_flag(s: &str) -> Option<bool> {
    match s {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}
