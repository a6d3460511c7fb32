// crates/tap-sink/tests/global_flush_on_exit.rs
//
// The test binary re-runs itself as a child process. The child logs through
// the shared sink, calls `flush_global`, and returns from `main` without
// shutting the writer down. The parent then reads the file the child left.
use std::env;
use std::fs;
use std::process::Command;
use std::thread;
use std::time::Duration;

use tap_core::Phase;
use tap_protocol::{encode_start_marker, parse_event_line, Marker};
use tap_sink::{flush_global, try_log_marker_exact};

const CHILD_VAR: &str = "TAP_SINK_EXIT_CHILD";
const TEST_NAME: &str = "accepted_lines_survive_process_exit";

fn start_marker(key: u64) -> Vec<u8> {
    let marker = Marker {
        phase: Phase::Start,
        is_request: true,
        is_push: false,
        sender: 5,
        receiver: 6,
        correlation_key: key,
    };
    let mut buf = Vec::new();
    encode_start_marker(&marker, 16, &mut buf).unwrap();
    buf
}

fn run_child() {
    assert!(try_log_marker_exact(&start_marker(0)));
    // let the writer go idle with the first line sitting in its buffer
    thread::sleep(Duration::from_millis(300));
    for key in 1..=10 {
        assert!(try_log_marker_exact(&start_marker(key)));
    }
    assert!(flush_global());
}

#[test]
fn accepted_lines_survive_process_exit() {
    if env::var_os(CHILD_VAR).is_some() {
        run_child();
        return;
    }

    // nothing opened in this process yet, so there is nothing to flush
    assert!(flush_global());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recv.log");
    let output = Command::new(env::current_exe().unwrap())
        .args([TEST_NAME, "--exact", "--test-threads=1"])
        .env(CHILD_VAR, "1")
        .env("ZMQ_RECV_TIMESTAMP_PATH", &path)
        // no periodic flush can land while the child runs
        .env("RECV_TAP_FLUSH_MS", "3600000")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "child failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let contents = fs::read_to_string(&path).unwrap();
    let keys: Vec<u64> = contents
        .lines()
        .filter_map(parse_event_line)
        .map(|e| e.correlation_key)
        .collect();
    assert_eq!(keys, (0..=10).collect::<Vec<u64>>());
}
