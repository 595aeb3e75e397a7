//! Error types for the feed handler service.
//!
//! These cover the adapter paths only (files, sockets, configuration).
//! The per-message hot path never produces a `Result`: queue-full, unknown
//! message types, and truncated blocks are counters by design.

use thiserror::Error;

/// Result type alias for feed handler operations.
pub type Result<T> = std::result::Result<T, FeedError>;

#[derive(Debug, Error)]
pub enum FeedError {
    /// File or socket I/O failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path or address being accessed.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The pcap global header magic is neither native nor byte-swapped.
    #[error("invalid pcap magic {found:#010x}: expected 0xa1b2c3d4 or 0xd4c3b2a1")]
    InvalidPcapMagic { found: u32 },

    /// The pcap file ends before the 24-byte global header.
    #[error("pcap global header truncated: need 24 bytes, got {got}")]
    TruncatedPcapHeader { got: usize },

    /// Configuration file could not be parsed.
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration value out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}

impl FeedError {
    /// Attach a path to an `io::Error`.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        FeedError::Io {
            path: path.into(),
            source,
        }
    }
}
