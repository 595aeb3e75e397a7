//! Fixed-point price representation.
//!
//! ITCH carries prices as unsigned 32-bit fixed-point with 4 decimal
//! places. Internally prices are signed 64-bit fixed-point with 6 decimal
//! places, leaving headroom for derived values (spreads, signed deltas)
//! without a second conversion boundary.

/// Internal price type: signed fixed-point with [`PRICE_SCALE`] scaling.
pub type Price = i64;

/// Internal scale: 6 decimal places.
pub const PRICE_SCALE: i64 = 1_000_000;

/// Wire scale used by ITCH 5.0: 4 decimal places.
pub const WIRE_PRICE_SCALE: i64 = 10_000;

/// Convert a wire price (unsigned, 10^-4) to the internal representation
/// (signed, 10^-6). The two extra decimal places mean a plain multiply by
/// 100; the widening to `i64` cannot overflow (`u32::MAX * 100 < i64::MAX`).
#[inline(always)]
pub const fn price_from_wire(wire: u32) -> Price {
    wire as i64 * (PRICE_SCALE / WIRE_PRICE_SCALE)
}

/// Render an internal price as an `f64` dollar value. Display-path only;
/// never feed the result back into book or signal arithmetic.
#[inline]
pub fn price_to_f64(price: Price) -> f64 {
    price as f64 / PRICE_SCALE as f64
}
