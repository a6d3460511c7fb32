// crates/tap-sink/tests/global_unavailable.rs
//
// A sink that cannot be opened is reported and remembered; markers are
// then recognized but not logged.
use std::env;

use tap_core::Phase;
use tap_protocol::{encode_start_marker, Marker};
use tap_sink::{flush_global, global, try_log_marker_exact, SinkError};

#[test]
fn unopenable_sink_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("recv.log");
    env::set_var("ZMQ_RECV_TIMESTAMP_PATH", &path);

    let mut start = Vec::new();
    let marker = Marker {
        phase: Phase::Start,
        is_request: true,
        is_push: true,
        sender: 1,
        receiver: 2,
        correlation_key: 9,
    };
    encode_start_marker(&marker, 1, &mut start).unwrap();

    assert!(!try_log_marker_exact(&start));
    assert!(!try_log_marker_exact(&start));

    match global() {
        Err(SinkError::Open { path: reported, .. }) => assert_eq!(reported, &path),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("sink should be unavailable"),
    }
    assert!(!flush_global());
}
