//! Shared types for the receive-path harness.

/// Identifier for a connected peer.
///
/// This is intentionally opaque; we just guarantee uniqueness
/// over the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

/// Per-connection counters, reported when the peer disconnects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Frames received, markers or not.
    pub frames: u64,

    /// Frames recognized as markers and queued to the sink.
    pub markers: u64,

    /// Payload bytes received, excluding length prefixes.
    pub bytes: u64,
}
