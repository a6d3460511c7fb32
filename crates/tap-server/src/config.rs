//! Configuration for the receive-path harness.
//!
//! Defaults can be overridden via environment variables:
//!
//! - `TAP_BIND_ADDR`      (default: "0.0.0.0")
//! - `TAP_PORT`           (default: "9100")
//! - `TAP_MAX_CLIENTS`    (default: "1024")
//! - `TAP_SCAN_POLICY`    (default: "repeated"; or "exact")
//! - `TAP_MAX_FRAME_LEN`  (default: "16777216")
//!
//! The event sink has its own variables; see `tap_sink::SinkConfig`.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use tap_protocol::ScanPolicy;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on.
    pub port: u16,

    /// Maximum number of simultaneously connected peers.
    pub max_clients: usize,

    /// How each frame is scanned for markers.
    pub policy: ScanPolicy,

    /// Frames larger than this close the connection.
    pub max_frame_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0".to_string(),
            port: 9100,
            max_clients: 1024,
            policy: ScanPolicy::Repeated,
            max_frame_len: 16 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to the defaults above.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();
        let bind_addr = env::var("TAP_BIND_ADDR").unwrap_or(defaults.bind_addr);
        let port = read_env_or_default("TAP_PORT", defaults.port)?;
        let max_clients = read_env_or_default("TAP_MAX_CLIENTS", defaults.max_clients)?;
        let policy = read_env_or_default("TAP_SCAN_POLICY", defaults.policy)?;
        let max_frame_len = read_env_or_default("TAP_MAX_FRAME_LEN", defaults.max_frame_len)?;

        Ok(Config {
            bind_addr,
            port,
            max_clients,
            policy,
            max_frame_len,
        })
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn read_env_or_default<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("invalid {key}={val:?}: {e}")),
        Err(_) => Ok(default),
    }
}
