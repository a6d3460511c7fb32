//! Error types for the event sink.
//!
//! Only initialization can fail. Once a sink is open, write problems are
//! logged and the affected lines dropped; nothing is returned to callers
//! on the hot path.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    /// An environment variable holds a value that cannot be used.
    #[error("invalid value {value:?} for {var}: {reason}")]
    Config {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// The event log cannot be created or opened for append.
    #[error("cannot open event log {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The writer's runtime could not be built.
    #[error("cannot build event writer runtime: {0}")]
    Runtime(#[source] io::Error),

    /// The writer thread could not be spawned.
    #[error("cannot spawn event writer thread: {0}")]
    Spawn(#[source] io::Error),
}
