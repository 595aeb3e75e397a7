//! Normalization of order-flow records to [`Event`].
//!
//! Each constructor copies the fields downstream consumers need out of the
//! borrowed wire view into a self-contained host-endian `Event`; the view
//! itself never escapes the decode call. Fields a message does not carry
//! stay at their `Event::empty()` zeros.

use feed_types::{price_from_wire, Event, EventKind, Side, Symbol};

use crate::messages::{
    AddOrder, AddOrderMpid, OrderCancel, OrderDelete, OrderExecuted, OrderExecutedWithPrice,
    OrderReplace, Trade,
};

pub fn add_order_event(msg: &AddOrder) -> Event {
    Event {
        kind: EventKind::AddOrder as u8,
        timestamp_ns: msg.timestamp_ns(),
        order_ref: msg.order_reference_number.get(),
        symbol: Symbol(msg.stock),
        side: Side::from_wire(msg.buy_sell_indicator) as u8,
        price: price_from_wire(msg.price.get()),
        quantity: msg.shares.get(),
        ..Event::empty()
    }
}

pub fn add_order_mpid_event(msg: &AddOrderMpid) -> Event {
    Event {
        kind: EventKind::AddOrderMpid as u8,
        timestamp_ns: msg.timestamp_ns(),
        order_ref: msg.order_reference_number.get(),
        symbol: Symbol(msg.stock),
        side: Side::from_wire(msg.buy_sell_indicator) as u8,
        price: price_from_wire(msg.price.get()),
        quantity: msg.shares.get(),
        ..Event::empty()
    }
}

pub fn order_executed_event(msg: &OrderExecuted) -> Event {
    Event {
        kind: EventKind::OrderExecuted as u8,
        timestamp_ns: msg.timestamp_ns(),
        order_ref: msg.order_reference_number.get(),
        executed_quantity: msg.executed_shares.get(),
        ..Event::empty()
    }
}

/// The priced execution ('C') shares `OrderExecuted` with the plain one;
/// the execution price is the only extra field it contributes.
pub fn order_executed_with_price_event(msg: &OrderExecutedWithPrice) -> Event {
    Event {
        kind: EventKind::OrderExecuted as u8,
        timestamp_ns: msg.timestamp_ns(),
        order_ref: msg.order_reference_number.get(),
        executed_quantity: msg.executed_shares.get(),
        price: price_from_wire(msg.execution_price.get()),
        ..Event::empty()
    }
}

pub fn order_cancel_event(msg: &OrderCancel) -> Event {
    Event {
        kind: EventKind::OrderCancel as u8,
        timestamp_ns: msg.timestamp_ns(),
        order_ref: msg.order_reference_number.get(),
        quantity: msg.cancelled_shares.get(),
        ..Event::empty()
    }
}

pub fn order_delete_event(msg: &OrderDelete) -> Event {
    Event {
        kind: EventKind::OrderDelete as u8,
        timestamp_ns: msg.timestamp_ns(),
        order_ref: msg.order_reference_number.get(),
        ..Event::empty()
    }
}

pub fn order_replace_event(msg: &OrderReplace) -> Event {
    Event {
        kind: EventKind::OrderReplace as u8,
        timestamp_ns: msg.timestamp_ns(),
        order_ref: msg.original_order_reference_number.get(),
        new_order_ref: msg.new_order_reference_number.get(),
        price: price_from_wire(msg.price.get()),
        quantity: msg.shares.get(),
        ..Event::empty()
    }
}

pub fn trade_event(msg: &Trade) -> Event {
    Event {
        kind: EventKind::Trade as u8,
        timestamp_ns: msg.timestamp_ns(),
        order_ref: msg.order_reference_number.get(),
        symbol: Symbol(msg.stock),
        side: Side::from_wire(msg.buy_sell_indicator) as u8,
        price: price_from_wire(msg.price.get()),
        quantity: msg.shares.get(),
        ..Event::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::msg_type;
    use zerocopy::byteorder::{BigEndian, U16, U32, U64};

    type U16be = U16<BigEndian>;
    type U32be = U32<BigEndian>;
    type U64be = U64<BigEndian>;

    #[test]
    fn test_add_order_round_trip() {
        let msg = AddOrder {
            message_type: msg_type::ADD_ORDER,
            stock_locate: U16be::new(1),
            tracking_number: U16be::new(0),
            // 34_200_000_000_000 ns = 9:30:00.000
            timestamp: [0x1F, 0x1A, 0xCE, 0xD9, 0xF0, 0x00],
            order_reference_number: U64be::new(123_456_789),
            buy_sell_indicator: b'B',
            shares: U32be::new(100),
            stock: *b"AAPL    ",
            price: U32be::new(1_500_000),
        };

        let ev = add_order_event(&msg);
        assert_eq!(ev.kind(), EventKind::AddOrder);
        assert_eq!(ev.timestamp_ns, 34_200_000_000_000);
        assert_eq!(ev.order_ref, 123_456_789);
        assert_eq!(ev.symbol, Symbol::new("AAPL"));
        assert_eq!(ev.side(), Side::Buy);
        assert_eq!(ev.price, 150_000_000);
        assert_eq!(ev.quantity, 100);
        assert_eq!(ev.executed_quantity, 0);
        assert_eq!(ev.new_order_ref, 0);
    }

    #[test]
    fn test_executions_share_kind() {
        let plain = OrderExecuted {
            message_type: msg_type::ORDER_EXECUTED,
            stock_locate: U16be::new(1),
            tracking_number: U16be::new(0),
            timestamp: [0, 0, 0, 0, 0, 1],
            order_reference_number: U64be::new(11),
            executed_shares: U32be::new(50),
            match_number: U64be::new(1),
        };
        let priced = OrderExecutedWithPrice {
            message_type: msg_type::ORDER_EXECUTED_WITH_PRICE,
            stock_locate: U16be::new(1),
            tracking_number: U16be::new(0),
            timestamp: [0, 0, 0, 0, 0, 2],
            order_reference_number: U64be::new(12),
            executed_shares: U32be::new(60),
            match_number: U64be::new(2),
            printable: b'Y',
            execution_price: U32be::new(2_000_000),
        };

        let a = order_executed_event(&plain);
        let b = order_executed_with_price_event(&priced);

        assert_eq!(a.kind(), EventKind::OrderExecuted);
        assert_eq!(b.kind(), EventKind::OrderExecuted);
        assert_eq!(a.executed_quantity, 50);
        assert_eq!(b.executed_quantity, 60);
        assert_eq!(a.price, 0);
        assert_eq!(b.price, 200_000_000);
    }

    #[test]
    fn test_replace_carries_both_refs() {
        let msg = OrderReplace {
            message_type: msg_type::ORDER_REPLACE,
            stock_locate: U16be::new(1),
            tracking_number: U16be::new(0),
            timestamp: [0; 6],
            original_order_reference_number: U64be::new(100),
            new_order_reference_number: U64be::new(200),
            shares: U32be::new(10),
            price: U32be::new(55_500),
        };

        let ev = order_replace_event(&msg);
        assert_eq!(ev.kind(), EventKind::OrderReplace);
        assert_eq!(ev.order_ref, 100);
        assert_eq!(ev.new_order_ref, 200);
        assert_eq!(ev.price, 5_550_000);
        assert_eq!(ev.quantity, 10);
    }

    #[test]
    fn test_cancel_quantity_is_cancelled_shares() {
        let msg = OrderCancel {
            message_type: msg_type::ORDER_CANCEL,
            stock_locate: U16be::new(1),
            tracking_number: U16be::new(0),
            timestamp: [0; 6],
            order_reference_number: U64be::new(77),
            cancelled_shares: U32be::new(25),
        };

        let ev = order_cancel_event(&msg);
        assert_eq!(ev.kind(), EventKind::OrderCancel);
        assert_eq!(ev.quantity, 25);
    }

    #[test]
    fn test_delete_is_reference_only() {
        let msg = OrderDelete {
            message_type: msg_type::ORDER_DELETE,
            stock_locate: U16be::new(1),
            tracking_number: U16be::new(0),
            timestamp: [0; 6],
            order_reference_number: U64be::new(31),
        };

        let ev = order_delete_event(&msg);
        assert_eq!(ev.kind(), EventKind::OrderDelete);
        assert_eq!(ev.order_ref, 31);
        assert_eq!(ev.quantity, 0);
        assert_eq!(ev.price, 0);
    }

    #[test]
    fn test_trade_event() {
        let msg = Trade {
            message_type: msg_type::TRADE,
            stock_locate: U16be::new(3),
            tracking_number: U16be::new(0),
            timestamp: [0; 6],
            order_reference_number: U64be::new(0),
            buy_sell_indicator: b'S',
            shares: U32be::new(500),
            stock: *b"MSFT    ",
            price: U32be::new(3_101_500),
            match_number: U64be::new(88),
        };

        let ev = trade_event(&msg);
        assert_eq!(ev.kind(), EventKind::Trade);
        assert_eq!(ev.side(), Side::Sell);
        assert_eq!(ev.symbol, Symbol::new("MSFT"));
        assert_eq!(ev.price, 310_150_000);
        assert_eq!(ev.quantity, 500);
    }
}
