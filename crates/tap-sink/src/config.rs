//! Configuration for the event sink.
//!
//! Defaults can be overridden via environment variables:
//!
//! - `ZMQ_RECV_TIMESTAMP_PATH` (default: "./zmq_recv_timestamp.log")
//! - `RECV_TAP_FLUSH_MS`       (default: "3000")
//! - `RECV_TAP_QUEUE_CAPACITY` (default: "65536")
//! - `RECV_TAP_TRACE_KEY`      (default: unset)

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SinkError;

pub const LOG_PATH_VAR: &str = "ZMQ_RECV_TIMESTAMP_PATH";
pub const FLUSH_MS_VAR: &str = "RECV_TAP_FLUSH_MS";
pub const QUEUE_CAPACITY_VAR: &str = "RECV_TAP_QUEUE_CAPACITY";
pub const TRACE_KEY_VAR: &str = "RECV_TAP_TRACE_KEY";

pub const DEFAULT_LOG_PATH: &str = "./zmq_recv_timestamp.log";
pub const DEFAULT_FLUSH_MS: u64 = 3000;
pub const DEFAULT_QUEUE_CAPACITY: usize = 65536;

/// Sink configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Event log file, opened for append.
    pub log_path: PathBuf,

    /// Fixed cadence at which the writer flushes, independent of volume.
    pub flush_interval: Duration,

    /// Lines that may wait for the writer before new ones are dropped.
    pub queue_capacity: usize,

    /// Correlation key that triggers an operator-visible diagnostic when
    /// recognized. Debug aid only.
    pub trace_key: Option<u64>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            flush_interval: Duration::from_millis(DEFAULT_FLUSH_MS),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            trace_key: None,
        }
    }
}

impl SinkConfig {
    /// Construct a `SinkConfig` from environment variables, falling back
    /// to the defaults above.
    pub fn from_env() -> Result<Self, SinkError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`SinkConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SinkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_path = lookup(LOG_PATH_VAR)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH));

        let flush_ms: u64 = read_or_default(&lookup, FLUSH_MS_VAR, DEFAULT_FLUSH_MS)?;
        if flush_ms == 0 {
            return Err(invalid(FLUSH_MS_VAR, "0", "must be at least 1"));
        }

        let queue_capacity: usize =
            read_or_default(&lookup, QUEUE_CAPACITY_VAR, DEFAULT_QUEUE_CAPACITY)?;
        if queue_capacity == 0 {
            return Err(invalid(QUEUE_CAPACITY_VAR, "0", "must be at least 1"));
        }

        let trace_key = match lookup(TRACE_KEY_VAR) {
            Some(val) => Some(parse_var(TRACE_KEY_VAR, &val)?),
            None => None,
        };

        Ok(SinkConfig {
            log_path,
            flush_interval: Duration::from_millis(flush_ms),
            queue_capacity,
            trace_key,
        })
    }

    /// Convenience: defaults with a different log path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        SinkConfig {
            log_path: path.into(),
            ..SinkConfig::default()
        }
    }
}

fn read_or_default<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, SinkError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(val) => parse_var(key, &val),
        None => Ok(default),
    }
}

fn parse_var<T>(key: &'static str, val: &str) -> Result<T, SinkError>
where
    T: FromStr,
    T::Err: Display,
{
    val.trim()
        .parse::<T>()
        .map_err(|e| invalid(key, val, &e.to_string()))
}

fn invalid(var: &'static str, value: &str, reason: &str) -> SinkError {
    SinkError::Config {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
