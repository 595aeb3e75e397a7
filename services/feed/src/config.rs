//! Feed handler configuration.
//!
//! Values are plain inputs to the constructors; the core itself reads no
//! files and no environment. A TOML file can override the defaults, and
//! the CLI can override the file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};

/// Tuning and placement settings for one feed instance.
///
/// ```toml
/// # feed.toml
/// [feed]
/// queue_capacity = 65536
/// listen_port = 26477
///
/// [cores]
/// pin = true
/// producer = 1
/// consumer = 2
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    pub feed: FeedSettings,
    pub cores: CoreSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Ring capacity in slots; must be a power of two. One slot is the
    /// full/empty sentinel.
    pub queue_capacity: usize,
    /// UDP port for live ingress.
    pub listen_port: u16,
    /// Receive buffer per datagram; MoldUDP64 packets fit well inside a
    /// standard MTU but jumbo frames are common on exchange feeds.
    pub recv_buffer_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CoreSettings {
    /// Pin the producer and consumer threads to dedicated cores.
    pub pin: bool,
    /// Core for packet reception and decoding.
    pub producer: usize,
    /// Core for event consumption.
    pub consumer: usize,
}

impl Default for FeedSettings {
    fn default() -> Self {
        FeedSettings {
            queue_capacity: 65_536,
            listen_port: 26_477,
            recv_buffer_bytes: 9_216,
        }
    }
}

impl Default for CoreSettings {
    fn default() -> Self {
        CoreSettings {
            pin: true,
            producer: 1,
            consumer: 2,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            feed: FeedSettings::default(),
            cores: CoreSettings::default(),
        }
    }
}

impl FeedConfig {
    /// Load from a TOML file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| FeedError::io(path.display().to_string(), e))?;
        let config: FeedConfig =
            toml::from_str(&text).map_err(|source| FeedError::ConfigParse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.feed.queue_capacity.is_power_of_two() || self.feed.queue_capacity < 2 {
            return Err(FeedError::InvalidConfig {
                reason: format!(
                    "queue_capacity must be a power of two >= 2, got {}",
                    self.feed.queue_capacity
                ),
            });
        }
        if self.cores.pin && self.cores.producer == self.cores.consumer {
            return Err(FeedError::InvalidConfig {
                reason: format!(
                    "producer and consumer pinned to the same core {}",
                    self.cores.producer
                ),
            });
        }
        Ok(())
    }
}
