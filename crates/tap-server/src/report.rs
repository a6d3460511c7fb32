//! Offline latency report over an event log.
//!
//! Reads log lines in file order, pairs start and end markers with a
//! [`LatencyTracker`], and summarizes the resulting spans. Free-text
//! lines written through `log_text` are counted and skipped.

use std::io::{self, BufRead};

use tap_core::{LatencyStats, LatencyTracker, Span};
use tap_protocol::parse_event_line;

#[derive(Debug, Default)]
pub struct Report {
    /// Lines that parsed as events.
    pub events: u64,

    /// Blank, free-text, or malformed lines.
    pub skipped_lines: u64,

    /// Completed spans in the order their end marker was seen.
    pub spans: Vec<Span>,

    pub unmatched_starts: usize,
    pub orphan_ends: u64,
    pub duplicate_starts: u64,
}

impl Report {
    /// Latency summary over all spans, `None` if there are none.
    pub fn stats(&self) -> Option<LatencyStats> {
        LatencyStats::from_latencies(self.spans.iter().map(Span::latency_us).collect())
    }
}

/// Build a report from any line source.
pub fn summarize<R: BufRead>(reader: R) -> io::Result<Report> {
    let mut tracker = LatencyTracker::new();
    let mut report = Report::default();

    for line in reader.lines() {
        let line = line?;
        match parse_event_line(&line) {
            Some(event) => {
                report.events += 1;
                if let Some(span) = tracker.observe(&event) {
                    report.spans.push(span);
                }
            }
            None => report.skipped_lines += 1,
        }
    }

    report.unmatched_starts = tracker.unmatched_starts();
    report.orphan_ends = tracker.orphan_ends();
    report.duplicate_starts = tracker.duplicate_starts();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
# recv-tap listening on 0.0.0.0:9100
100 1 0 1 7 1 2
110 1 0 1 8 1 2
130 0 0 1 7 2 1
135 1 0 1 8 1 2
190 0 0 1 8 2 1
200 0 0 1 9 2 1
";

    #[test]
    fn pairs_spans_and_counts_leftovers() {
        let report = summarize(LOG.as_bytes()).unwrap();
        assert_eq!(report.events, 6);
        assert_eq!(report.skipped_lines, 1);
        assert_eq!(report.duplicate_starts, 1);
        assert_eq!(report.orphan_ends, 1);
        assert_eq!(report.unmatched_starts, 0);

        let latencies: Vec<i64> = report.spans.iter().map(Span::latency_us).collect();
        assert_eq!(latencies, vec![30, 80]);

        let stats = report.stats().unwrap();
        assert_eq!((stats.min, stats.max, stats.count), (30, 80, 2));
    }

    #[test]
    fn empty_log_has_no_stats() {
        let report = summarize(&b""[..]).unwrap();
        assert_eq!(report.events, 0);
        assert!(report.stats().is_none());
    }
}
