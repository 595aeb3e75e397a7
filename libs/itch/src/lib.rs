//! # ITCH 5.0 Zero-Copy Decoder
//!
//! NASDAQ TotalView-ITCH 5.0 message layouts and a zero-copy decoder.
//!
//! ## Purpose
//!
//! Given one ITCH message (the bytes after a MoldUDP64 length prefix), the
//! decoder identifies the type from the leading byte, validates the length
//! against the protocol's fixed size table, reinterprets the bytes in place
//! as the corresponding wire record, and hands the typed view to a sink
//! with the hot host-endian projections (timestamp, price, quantity)
//! already computed. No allocation, no copying of message bytes.
//!
//! ## Wire format
//!
//! Every record is packed big-endian with a common 11-byte prefix: type
//! byte, 2-byte stock locate, 2-byte tracking number, 6-byte nanosecond
//! timestamp. All 22 record layouts of the 5.0 protocol are implemented
//! with their exact sizes; the record structs are zerocopy views, so field
//! access performs the big-endian→host conversion on read and the views
//! never outlive the input buffer.
//!
//! ## Fan-out
//!
//! Dispatch goes through the [`ItchSink`] trait: one default-no-op method
//! per order-flow type. The decoder is generic over the sink, so the
//! per-message path is a static call with no heap indirection.

pub mod decoder;
pub mod messages;
pub mod normalize;

pub use decoder::{Decoder, DecoderStats, ItchSink};
pub use messages::{message_size, msg_type};
