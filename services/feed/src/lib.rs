//! # Feed Handler Service
//!
//! The adapter half of the pipeline: gets datagrams from somewhere (pcap
//! replay, raw ITCH capture, live UDP socket) and drives them through the
//! core — MoldUDP64 session → ITCH decoder → SPSC ring — on a producer
//! thread, with a consumer thread draining normalized events on the other
//! side.
//!
//! ```text
//! [bytes] → Session → Decoder → ring.try_push   (producer thread)
//!                                   │
//!                                   ▼
//!                              ring.try_pop → downstream (consumer thread)
//! ```
//!
//! The core components are not internally synchronized; the only state
//! crossing the thread boundary is the ring's two atomic indices and the
//! shared `running` flag.

pub mod config;
pub mod error;
pub mod handler;
pub mod packet;
pub mod pcap;
pub mod pump;
pub mod stats;

pub use config::FeedConfig;
pub use error::{FeedError, Result};
pub use handler::{ConsumerReport, FeedHandler};
pub use pump::PacketPump;
pub use stats::FeedStats;
