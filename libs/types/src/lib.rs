//! # Feed Type System
//!
//! Shared plain types for the ITCH feed handler. Everything downstream of
//! the decoder speaks these types: the normalized [`Event`] record carried
//! through the SPSC ring, the [`Side`]/[`EventKind`] tags, the fixed-layout
//! [`Symbol`], and the fixed-point price helpers.
//!
//! ## Design
//!
//! - **No precision loss**: prices are scaled integers, never floats. The
//!   wire carries unsigned 32-bit values at 10^-4; internally we widen to
//!   signed 64-bit at 10^-6 (see [`price`]).
//! - **Trivially copyable events**: [`Event`] is a `#[repr(C)]` POD with
//!   explicit padding so it can live in a lock-free ring slot and be copied
//!   out without any destructor coordination.
//! - **Enums stored as primitives**: `Event` keeps `kind`/`side` as `u8` so
//!   every bit pattern of the struct stays zerocopy-compatible; typed
//!   accessors recover the enums.

pub mod event;
pub mod price;
pub mod time;

pub use event::{Event, EventKind, Side, Symbol};
pub use price::{price_from_wire, price_to_f64, Price, PRICE_SCALE, WIRE_PRICE_SCALE};
pub use time::wall_clock_ns;

/// Nanoseconds-since-midnight timestamp as carried by ITCH messages.
pub type Timestamp = u64;

/// Order reference number assigned by the exchange.
pub type OrderRef = u64;

/// Share quantity.
pub type Quantity = u32;

/// MoldUDP64 sequence number.
pub type SequenceNumber = u64;
