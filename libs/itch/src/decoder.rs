//! Zero-copy decoder and sink fan-out.
//!
//! The decoder owns nothing but counters and the sink. Per message it does
//! a size-table check, one zerocopy cast, and one static sink call; the
//! typed record views alias the caller's buffer and must not outlive the
//! call (the `'_` lifetimes on the sink methods enforce exactly that).

use zerocopy::Ref;

use feed_types::price_from_wire;

use crate::messages::{
    message_size, msg_type, AddOrder, AddOrderMpid, OrderCancel, OrderDelete, OrderExecuted,
    OrderExecutedWithPrice, OrderReplace, Trade,
};

/// Receiver for decoded order-flow messages.
///
/// One method per order-flow type, default no-op, called with the typed
/// wire view plus the host-endian projections every consumer needs
/// (timestamp, price at 10^-6, quantity). Non-order messages are reported
/// through [`ItchSink::on_other`] with their type byte only.
///
/// The decoder is generic over the sink, so overriding only the methods a
/// stage cares about costs nothing for the rest.
pub trait ItchSink {
    fn on_add_order(&mut self, _msg: &AddOrder, _ts: u64, _price: i64, _shares: u32) {}

    fn on_add_order_mpid(&mut self, _msg: &AddOrderMpid, _ts: u64, _price: i64, _shares: u32) {}

    fn on_order_executed(&mut self, _msg: &OrderExecuted, _ts: u64) {}

    fn on_order_executed_with_price(
        &mut self,
        _msg: &OrderExecutedWithPrice,
        _ts: u64,
        _price: i64,
    ) {
    }

    fn on_order_cancel(&mut self, _msg: &OrderCancel, _ts: u64) {}

    fn on_order_delete(&mut self, _msg: &OrderDelete, _ts: u64) {}

    fn on_order_replace(&mut self, _msg: &OrderReplace, _ts: u64, _price: i64, _shares: u32) {}

    fn on_trade(&mut self, _msg: &Trade, _ts: u64, _price: i64, _shares: u32) {}

    /// A valid non-order message (directory, halts, imbalance, ...).
    fn on_other(&mut self, _message_type: u8) {}
}

/// Decoder statistics. Counters only; reading them is only meaningful from
/// the producer thread or after the threads are joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DecoderStats {
    pub total_messages: u64,
    pub add_orders: u64,
    pub order_executed: u64,
    pub order_cancelled: u64,
    pub order_deleted: u64,
    pub order_replaced: u64,
    pub trades: u64,
    pub other_messages: u64,
    /// Unknown type byte, or a declared length shorter than the type's
    /// wire size. Either way the message was rejected whole.
    pub unknown_messages: u64,
    /// Order-carrying messages whose side byte was neither 'B' nor 'S';
    /// those decode as buys (see `Side::from_wire`) but are counted here.
    pub unknown_side: u64,
}

/// Zero-copy ITCH 5.0 decoder dispatching to an [`ItchSink`].
pub struct Decoder<S> {
    sink: S,
    stats: DecoderStats,
}

impl<S: ItchSink> Decoder<S> {
    pub fn new(sink: S) -> Self {
        Decoder {
            sink,
            stats: DecoderStats::default(),
        }
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = DecoderStats::default();
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Decode a single ITCH message starting at `data[0]`.
    ///
    /// Returns the number of bytes consumed: the type's wire size on
    /// success, 0 for an unknown type byte or a buffer shorter than the
    /// type's wire size. No partial message is ever emitted.
    pub fn decode(&mut self, data: &[u8]) -> usize {
        let Some(&message_type) = data.first() else {
            self.stats.unknown_messages += 1;
            return 0;
        };

        let expected = message_size(message_type);
        if expected == 0 || data.len() < expected {
            self.stats.unknown_messages += 1;
            return 0;
        }

        match message_type {
            msg_type::ADD_ORDER => {
                let msg = view::<AddOrder>(&data[..expected]);
                self.stats.add_orders += 1;
                self.note_side(msg.buy_sell_indicator);
                self.sink.on_add_order(
                    msg,
                    msg.timestamp_ns(),
                    price_from_wire(msg.price.get()),
                    msg.shares.get(),
                );
            }
            msg_type::ADD_ORDER_MPID => {
                let msg = view::<AddOrderMpid>(&data[..expected]);
                self.stats.add_orders += 1;
                self.note_side(msg.buy_sell_indicator);
                self.sink.on_add_order_mpid(
                    msg,
                    msg.timestamp_ns(),
                    price_from_wire(msg.price.get()),
                    msg.shares.get(),
                );
            }
            msg_type::ORDER_EXECUTED => {
                let msg = view::<OrderExecuted>(&data[..expected]);
                self.stats.order_executed += 1;
                self.sink.on_order_executed(msg, msg.timestamp_ns());
            }
            msg_type::ORDER_EXECUTED_WITH_PRICE => {
                let msg = view::<OrderExecutedWithPrice>(&data[..expected]);
                self.stats.order_executed += 1;
                self.sink.on_order_executed_with_price(
                    msg,
                    msg.timestamp_ns(),
                    price_from_wire(msg.execution_price.get()),
                );
            }
            msg_type::ORDER_CANCEL => {
                let msg = view::<OrderCancel>(&data[..expected]);
                self.stats.order_cancelled += 1;
                self.sink.on_order_cancel(msg, msg.timestamp_ns());
            }
            msg_type::ORDER_DELETE => {
                let msg = view::<OrderDelete>(&data[..expected]);
                self.stats.order_deleted += 1;
                self.sink.on_order_delete(msg, msg.timestamp_ns());
            }
            msg_type::ORDER_REPLACE => {
                let msg = view::<OrderReplace>(&data[..expected]);
                self.stats.order_replaced += 1;
                self.sink.on_order_replace(
                    msg,
                    msg.timestamp_ns(),
                    price_from_wire(msg.price.get()),
                    msg.shares.get(),
                );
            }
            msg_type::TRADE => {
                let msg = view::<Trade>(&data[..expected]);
                self.stats.trades += 1;
                self.note_side(msg.buy_sell_indicator);
                self.sink.on_trade(
                    msg,
                    msg.timestamp_ns(),
                    price_from_wire(msg.price.get()),
                    msg.shares.get(),
                );
            }
            // Administrative and informational types: counted, not
            // normalized.
            _ => {
                self.stats.other_messages += 1;
                self.sink.on_other(message_type);
            }
        }

        self.stats.total_messages += 1;
        expected
    }

    #[inline(always)]
    fn note_side(&mut self, side_byte: u8) {
        if side_byte != b'B' && side_byte != b'S' {
            self.stats.unknown_side += 1;
        }
    }
}

/// Reinterpret `bytes` as a wire record. Callers must have already checked
/// `bytes.len() == size_of::<T>()`, which makes the `Ref` construction
/// infallible; records are `Unaligned`, so any address is acceptable.
#[inline(always)]
fn view<T: zerocopy::FromBytes + zerocopy::Unaligned>(bytes: &[u8]) -> &T {
    Ref::<_, T>::new_unaligned(bytes)
        .expect("caller checked the record length")
        .into_ref()
}
