//! tap-core
//!
//! Pure receive-path tap types:
//! - events (start / end markers observed on the transport)
//! - phases
//! - microsecond clock
//! - start → end latency pairing for offline analysis

pub mod phase;
pub mod event;
pub mod clock;
pub mod latency;

pub use phase::Phase;
pub use event::Event;
pub use clock::now_micros;
pub use latency::{LatencyStats, LatencyTracker, Span};
