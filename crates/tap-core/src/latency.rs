//! Start → end pairing over a stream of logged events.
//!
//! The tap itself only writes one line per recognized marker. Turning
//! those lines into latencies happens offline: feed events in log order
//! to a [`LatencyTracker`], which remembers open starts keyed by
//! `(correlation_key, is_request, is_push)` and closes them when the
//! matching end arrives.
//!
//! Markers may be duplicated in a stream. The first start for a key wins
//! (later duplicates are counted, not re-timed); an end with no open start
//! is counted as an orphan.

use std::collections::HashMap;

use crate::event::Event;
use crate::phase::Phase;

/// Key under which a start waits for its end.
type PairKey = (u64, bool, bool);

fn pair_key(event: &Event) -> PairKey {
    (event.correlation_key, event.is_request, event.is_push)
}

/// A completed start → end pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub correlation_key: u64,
    pub is_request: bool,
    pub is_push: bool,

    /// Sender / receiver as seen on the start marker.
    pub sender: i32,
    pub receiver: i32,

    pub started_at: i64,
    pub ended_at: i64,
}

impl Span {
    /// End minus start, in microseconds. Can be negative when the two
    /// markers were observed on hosts with skewed clocks. Saturates at the
    /// `i64` bounds for corrupt timestamps.
    pub fn latency_us(&self) -> i64 {
        self.ended_at.saturating_sub(self.started_at)
    }
}

/// Pairs start and end events.
#[derive(Debug, Default)]
pub struct LatencyTracker {
    open: HashMap<PairKey, Event>,
    orphan_ends: u64,
    duplicate_starts: u64,
}

impl LatencyTracker {
    pub fn new() -> Self {
        LatencyTracker::default()
    }

    /// Feed one event. Returns the completed span when `event` closes an
    /// open start.
    pub fn observe(&mut self, event: &Event) -> Option<Span> {
        let key = pair_key(event);
        match event.phase {
            Phase::Start => {
                if self.open.contains_key(&key) {
                    self.duplicate_starts += 1;
                } else {
                    self.open.insert(key, *event);
                }
                None
            }
            Phase::End => match self.open.remove(&key) {
                Some(start) => Some(Span {
                    correlation_key: start.correlation_key,
                    is_request: start.is_request,
                    is_push: start.is_push,
                    sender: start.sender,
                    receiver: start.receiver,
                    started_at: start.observed_at,
                    ended_at: event.observed_at,
                }),
                None => {
                    self.orphan_ends += 1;
                    None
                }
            },
        }
    }

    /// Starts still waiting for an end.
    pub fn unmatched_starts(&self) -> usize {
        self.open.len()
    }

    /// Ends that arrived with no open start.
    pub fn orphan_ends(&self) -> u64 {
        self.orphan_ends
    }

    /// Starts ignored because one was already open for the same key.
    pub fn duplicate_starts(&self) -> u64 {
        self.duplicate_starts
    }
}

/// Summary of a set of span latencies, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyStats {
    pub count: usize,
    pub min: i64,
    pub max: i64,
    pub mean: f64,
    pub p50: i64,
    pub p99: i64,
}

impl LatencyStats {
    /// Returns `None` for an empty input.
    pub fn from_latencies(mut latencies: Vec<i64>) -> Option<Self> {
        if latencies.is_empty() {
            return None;
        }
        latencies.sort_unstable();

        let count = latencies.len();
        let sum: i128 = latencies.iter().map(|&l| l as i128).sum();

        Some(LatencyStats {
            count,
            min: latencies[0],
            max: latencies[count - 1],
            mean: sum as f64 / count as f64,
            p50: nearest_rank(&latencies, 50),
            p99: nearest_rank(&latencies, 99),
        })
    }
}

/// Nearest-rank percentile over a sorted, non-empty slice.
fn nearest_rank(sorted: &[i64], pct: usize) -> i64 {
    let rank = (pct * sorted.len()).div_ceil(100);
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}
