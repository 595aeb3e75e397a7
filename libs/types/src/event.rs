//! Normalized order-flow event record.
//!
//! One `Event` summarizes one ITCH order-flow message in host endianness.
//! The struct is the element type of the SPSC ring, so it must stay
//! trivially copyable: `#[repr(C)]`, no heap fields, no destructor, enums
//! stored as `u8` primitives with typed accessors.

use serde::Serialize;
use zerocopy::{AsBytes, FromBytes, FromZeroes};

use crate::price::Price;

/// Order side. Wire byte `'B'` is buy, `'S'` is sell.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Buy = b'B',
    Sell = b'S',
}

impl Side {
    /// Decode the wire side byte. Anything other than `'S'` maps to `Buy`;
    /// callers that care about malformed sides count them separately.
    #[inline(always)]
    pub const fn from_wire(byte: u8) -> Self {
        match byte {
            b'S' => Side::Sell,
            _ => Side::Buy,
        }
    }
}

/// Kind tag for a normalized event.
///
/// `OrderExecuted` covers both the plain ('E') and priced ('C') execution
/// messages; the priced variant additionally populates [`Event::price`].
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    Unknown = 0,
    AddOrder = 1,
    AddOrderMpid = 2,
    OrderExecuted = 3,
    OrderCancel = 4,
    OrderDelete = 5,
    OrderReplace = 6,
    Trade = 7,
}

impl EventKind {
    #[inline(always)]
    pub const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => EventKind::AddOrder,
            2 => EventKind::AddOrderMpid,
            3 => EventKind::OrderExecuted,
            4 => EventKind::OrderCancel,
            5 => EventKind::OrderDelete,
            6 => EventKind::OrderReplace,
            7 => EventKind::Trade,
            _ => EventKind::Unknown,
        }
    }
}

/// Stock symbol: 8 ASCII bytes, right-padded with spaces, compared by raw
/// byte equality exactly as it appears on the wire.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
pub struct Symbol(pub [u8; 8]);

impl Symbol {
    pub const EMPTY: Symbol = Symbol([b' '; 8]);

    /// Build from a short ASCII ticker, right-padding with spaces.
    /// Panics if the input exceeds 8 bytes.
    pub fn new(ticker: &str) -> Self {
        let bytes = ticker.as_bytes();
        assert!(bytes.len() <= 8, "symbol longer than 8 bytes");
        let mut raw = [b' '; 8];
        raw[..bytes.len()].copy_from_slice(bytes);
        Symbol(raw)
    }

    /// The ticker with trailing padding removed. Lossy on non-UTF-8 input,
    /// which a conformant feed never produces.
    pub fn as_str(&self) -> &str {
        let end = self
            .0
            .iter()
            .rposition(|&b| b != b' ')
            .map_or(0, |i| i + 1);
        std::str::from_utf8(&self.0[..end]).unwrap_or("")
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized, host-endian order event.
///
/// Field ordering is grouped by size (u64/i64 → u32 → bytes) so the struct
/// packs to exactly 56 bytes with the explicit trailing padding and no
/// compiler-inserted holes. Do not reorder without re-checking the size
/// test below.
#[repr(C)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes)]
pub struct Event {
    /// Nanoseconds since midnight, from the ITCH timestamp.
    pub timestamp_ns: u64,
    /// Exchange order reference (original reference for replaces).
    pub order_ref: u64,
    /// Replacement order reference; only meaningful for `OrderReplace`.
    pub new_order_ref: u64,
    /// Fixed-point price at 10^-6 scale; zero when the message carries none.
    pub price: Price,
    /// Displayed share quantity (or cancelled quantity for cancels).
    pub quantity: u32,
    /// Executed share quantity; only meaningful for `OrderExecuted`.
    pub executed_quantity: u32,
    /// Wire symbol; `Symbol::EMPTY` when the message carries none.
    pub symbol: Symbol,
    /// [`EventKind`] as a primitive; see [`Event::kind`].
    pub kind: u8,
    /// [`Side`] as a primitive; see [`Event::side`].
    pub side: u8,
    pub _padding: [u8; 6],
}

impl Event {
    /// Struct size in bytes; one ring slot.
    pub const SIZE: usize = 56;

    /// An all-zero event with `Unknown` kind and buy side.
    pub const fn empty() -> Self {
        Event {
            timestamp_ns: 0,
            order_ref: 0,
            new_order_ref: 0,
            price: 0,
            quantity: 0,
            executed_quantity: 0,
            symbol: Symbol::EMPTY,
            kind: EventKind::Unknown as u8,
            side: Side::Buy as u8,
            _padding: [0; 6],
        }
    }

    #[inline(always)]
    pub fn kind(&self) -> EventKind {
        EventKind::from_u8(self.kind)
    }

    #[inline(always)]
    pub fn side(&self) -> Side {
        Side::from_wire(self.side)
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_size() {
        assert_eq!(std::mem::size_of::<Event>(), Event::SIZE);
        // ring slots copy by value; keep the record a multiple of 8
        assert_eq!(Event::SIZE % 8, 0);
    }

    #[test]
    fn test_side_from_wire() {
        assert_eq!(Side::from_wire(b'B'), Side::Buy);
        assert_eq!(Side::from_wire(b'S'), Side::Sell);
        // permissive default, counted by the decoder
        assert_eq!(Side::from_wire(b'?'), Side::Buy);
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            EventKind::Unknown,
            EventKind::AddOrder,
            EventKind::AddOrderMpid,
            EventKind::OrderExecuted,
            EventKind::OrderCancel,
            EventKind::OrderDelete,
            EventKind::OrderReplace,
            EventKind::Trade,
        ] {
            assert_eq!(EventKind::from_u8(kind as u8), kind);
        }
        assert_eq!(EventKind::from_u8(250), EventKind::Unknown);
    }

    #[test]
    fn test_symbol_padding_and_display() {
        let sym = Symbol::new("AAPL");
        assert_eq!(&sym.0, b"AAPL    ");
        assert_eq!(sym.as_str(), "AAPL");
        assert_eq!(Symbol::EMPTY.as_str(), "");
        // byte equality, not trimmed equality
        assert_ne!(Symbol::new("AAPL"), Symbol(*b"AAPL   X"));
    }

    #[test]
    fn test_empty_event() {
        let ev = Event::empty();
        assert_eq!(ev.kind(), EventKind::Unknown);
        assert_eq!(ev.side(), Side::Buy);
        assert_eq!(ev.symbol, Symbol::EMPTY);
    }
}
