// crates/tap-core/tests/latency_scenarios.rs
use tap_core::{LatencyStats, LatencyTracker, Span};
use tap_protocol::text_codec::parse_event_line;

const LOG: &str = include_str!("data/sample_events.log");

fn replay(lines: &[&str]) -> (LatencyTracker, Vec<Span>) {
    let mut tracker = LatencyTracker::new();
    let mut spans = Vec::new();
    for line in lines {
        if let Some(event) = parse_event_line(line) {
            if let Some(span) = tracker.observe(&event) {
                spans.push(span);
            }
        }
    }
    (tracker, spans)
}

#[test]
fn full_log_pairs_expected_spans() {
    let lines: Vec<&str> = LOG.lines().collect();
    let (tracker, spans) = replay(&lines);

    let latencies: Vec<(u64, bool, i64)> = spans
        .iter()
        .map(|s| (s.correlation_key, s.is_request, s.latency_us()))
        .collect();
    assert_eq!(
        latencies,
        vec![
            (101, true, 150),
            (101, false, 120),
            (202, true, 900),
            (302, true, 490),
            (301, true, 600),
        ]
    );

    assert_eq!(tracker.duplicate_starts(), 1);
    assert_eq!(tracker.orphan_ends(), 1);
    assert_eq!(tracker.unmatched_starts(), 1);

    let stats =
        LatencyStats::from_latencies(spans.iter().map(Span::latency_us).collect()).unwrap();
    assert_eq!(stats.count, 5);
    assert_eq!(stats.min, 120);
    assert_eq!(stats.max, 900);
    assert_eq!(stats.p50, 490);
}

#[test]
fn each_scenario_is_self_contained() {
    let mut scenarios: Vec<(String, Vec<&str>)> = Vec::new();
    for line in LOG.lines() {
        if let Some(name) = line.strip_prefix("#name:") {
            scenarios.push((name.trim().to_string(), Vec::new()));
        } else if let Some((_, lines)) = scenarios.last_mut() {
            lines.push(line);
        }
    }

    let expected_spans = [2, 1, 2, 0];
    assert_eq!(scenarios.len(), expected_spans.len());

    for ((name, lines), want) in scenarios.iter().zip(expected_spans) {
        let (_, spans) = replay(lines);
        assert_eq!(spans.len(), want, "scenario {name}");
    }
}
