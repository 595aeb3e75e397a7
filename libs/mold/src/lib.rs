//! # MoldUDP64 Session Layer
//!
//! NASDAQ's session protocol wrapping sequenced ITCH messages in UDP
//! datagrams. One datagram carries a 20-byte header (10-byte session id,
//! 64-bit first sequence number, 16-bit message count) followed by `count`
//! length-prefixed message blocks.
//!
//! [`Session`] consumes complete UDP payloads, hands every embedded
//! message to a [`SessionSink`] in wire order with its sequence number,
//! and tracks continuity: gaps are recorded and reported out-of-band,
//! duplicates and retransmissions are absorbed, heartbeats and the
//! end-of-session marker are recognized.
//!
//! Retransmission *requests* are someone else's job (a separate
//! connection, off the critical path); this layer only detects gaps and
//! heals when the retransmitted ranges arrive.

pub mod header;
pub mod session;

pub use header::MoldHeader;
pub use session::{Gap, Session, SessionSink, SessionState, SessionStats};
