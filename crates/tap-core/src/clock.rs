//! Wall-clock source for event timestamps.

use chrono::Utc;

/// Microseconds since the Unix epoch.
///
/// Taken at the moment an event is produced for the log, not when the
/// transport received the bytes.
#[inline]
pub fn now_micros() -> i64 {
    Utc::now().timestamp_micros()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_after_2020_and_monotone_enough() {
        // 2020-01-01T00:00:00Z
        const Y2020_US: i64 = 1_577_836_800_000_000;
        let a = now_micros();
        let b = now_micros();
        assert!(a > Y2020_US);
        assert!(b >= a);
    }
}
