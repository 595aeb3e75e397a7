//! Producer-side glue: session → decoder → ring.
//!
//! `PacketPump` owns the per-session state machine and the decoder, and
//! binds them together: every message the session emits goes through the
//! decoder, and every order-flow record the decoder recognizes becomes a
//! normalized [`Event`] pushed onto the ring. Runs entirely on the
//! producer thread; nothing in here is synchronized.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use feed_itch::messages::{
    AddOrder, AddOrderMpid, OrderCancel, OrderDelete, OrderExecuted, OrderExecutedWithPrice,
    OrderReplace, Trade,
};
use feed_itch::normalize;
use feed_itch::{Decoder, DecoderStats, ItchSink};
use feed_mold::{Gap, Session, SessionSink, SessionState, SessionStats};
use feed_spsc::RingBuffer;
use feed_types::Event;

use crate::packet::udp_payload;

/// Sink that normalizes order-flow records and pushes them onto the ring.
///
/// A full ring drops the event and bumps `buffer_full_count`; there is no
/// retry and no blocking on the hot path — backpressure policy belongs to
/// the consumer.
struct EventPush {
    queue: Arc<RingBuffer<Event>>,
    messages_pushed: u64,
    buffer_full_count: u64,
}

impl EventPush {
    #[inline(always)]
    fn push(&mut self, event: Event) {
        if self.queue.try_push(event) {
            self.messages_pushed += 1;
        } else {
            self.buffer_full_count += 1;
        }
    }
}

impl ItchSink for EventPush {
    fn on_add_order(&mut self, msg: &AddOrder, _ts: u64, _price: i64, _shares: u32) {
        self.push(normalize::add_order_event(msg));
    }

    fn on_add_order_mpid(&mut self, msg: &AddOrderMpid, _ts: u64, _price: i64, _shares: u32) {
        self.push(normalize::add_order_mpid_event(msg));
    }

    fn on_order_executed(&mut self, msg: &OrderExecuted, _ts: u64) {
        self.push(normalize::order_executed_event(msg));
    }

    fn on_order_executed_with_price(
        &mut self,
        msg: &OrderExecutedWithPrice,
        _ts: u64,
        _price: i64,
    ) {
        self.push(normalize::order_executed_with_price_event(msg));
    }

    fn on_order_cancel(&mut self, msg: &OrderCancel, _ts: u64) {
        self.push(normalize::order_cancel_event(msg));
    }

    fn on_order_delete(&mut self, msg: &OrderDelete, _ts: u64) {
        self.push(normalize::order_delete_event(msg));
    }

    fn on_order_replace(&mut self, msg: &OrderReplace, _ts: u64, _price: i64, _shares: u32) {
        self.push(normalize::order_replace_event(msg));
    }

    fn on_trade(&mut self, msg: &Trade, _ts: u64, _price: i64, _shares: u32) {
        self.push(normalize::trade_event(msg));
    }
}

/// Adapts the decoder to the session's message callback.
struct DecodeSink<'a>(&'a mut Decoder<EventPush>);

impl SessionSink for DecodeSink<'_> {
    fn on_message(&mut self, payload: &[u8], _sequence: u64) -> bool {
        // 0 bytes consumed means the decoder rejected the block (unknown
        // type or short payload); the rest of the packet is no longer
        // trustworthy, so stop emission there. The rejection shows up in
        // `unknown_messages`.
        self.0.decode(payload) > 0
    }

    fn on_gap(&mut self, gap: &Gap) {
        // The session already logged it; nothing to decode for a gap.
        debug!(start = gap.start, end = gap.end, "gap reported to pump");
    }
}

/// Producer-side counters, snapshot together with the component stats.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PumpStats {
    pub packets_processed: u64,
    pub bytes_processed: u64,
    pub invalid_packets: u64,
    pub messages_pushed: u64,
    pub buffer_full_count: u64,
}

/// Session + decoder + ring glue for one feed.
pub struct PacketPump {
    session: Session,
    decoder: Decoder<EventPush>,
    packets_processed: u64,
    bytes_processed: u64,
    invalid_packets: u64,
}

impl PacketPump {
    pub fn new(queue: Arc<RingBuffer<Event>>) -> Self {
        PacketPump {
            session: Session::new(),
            decoder: Decoder::new(EventPush {
                queue,
                messages_pushed: 0,
                buffer_full_count: 0,
            }),
            packets_processed: 0,
            bytes_processed: 0,
            invalid_packets: 0,
        }
    }

    /// Process a full Ethernet frame (pcap replay path).
    pub fn process_frame(&mut self, frame: &[u8]) -> bool {
        match udp_payload(frame) {
            Some(payload) => {
                if self.process_datagram_inner(payload) {
                    // account the whole frame, headers included
                    self.bytes_processed += (frame.len() - payload.len()) as u64;
                    true
                } else {
                    false
                }
            }
            None => {
                self.invalid_packets += 1;
                false
            }
        }
    }

    /// Process one MoldUDP64 UDP payload (live socket path).
    pub fn process_datagram(&mut self, payload: &[u8]) -> bool {
        self.process_datagram_inner(payload)
    }

    fn process_datagram_inner(&mut self, payload: &[u8]) -> bool {
        let mut sink = DecodeSink(&mut self.decoder);
        if self.session.process_packet(payload, &mut sink) {
            self.packets_processed += 1;
            self.bytes_processed += payload.len() as u64;
            true
        } else {
            self.invalid_packets += 1;
            false
        }
    }

    /// Feed a retransmission buffer (length-prefixed blocks, no header)
    /// into the session's gap-fill path.
    pub fn process_retransmission(&mut self, start_seq: u64, data: &[u8], count: u16) {
        let mut sink = DecodeSink(&mut self.decoder);
        self.session
            .process_retransmission(start_seq, data, count, &mut sink);
    }

    /// Process a chunk of a raw ITCH capture: 2-byte big-endian length
    /// prefixes with no MoldUDP64 framing, decoder driven directly.
    /// Returns the number of messages decoded.
    pub fn process_itch_chunk(&mut self, data: &[u8]) -> usize {
        let mut offset = 0;
        let mut decoded = 0;

        while offset + 2 <= data.len() {
            let msg_len = usize::from(u16::from_be_bytes([data[offset], data[offset + 1]]));
            offset += 2;
            if offset + msg_len > data.len() {
                break; // incomplete trailing message
            }

            if self.decoder.decode(&data[offset..offset + msg_len]) > 0 {
                decoded += 1;
            }
            offset += msg_len;
        }

        self.bytes_processed += offset as u64;
        decoded
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session_stats(&self) -> &SessionStats {
        self.session.stats()
    }

    pub fn decoder_stats(&self) -> &DecoderStats {
        self.decoder.stats()
    }

    pub fn stats(&self) -> PumpStats {
        let push = self.decoder.sink();
        PumpStats {
            packets_processed: self.packets_processed,
            bytes_processed: self.bytes_processed,
            invalid_packets: self.invalid_packets,
            messages_pushed: push.messages_pushed,
            buffer_full_count: push.buffer_full_count,
        }
    }

    /// Clear the session and every counter, keeping the ring attachment.
    pub fn reset(&mut self) {
        self.session.reset();
        self.decoder.reset_stats();
        let push = self.decoder.sink_mut();
        push.messages_pushed = 0;
        push.buffer_full_count = 0;
        self.packets_processed = 0;
        self.bytes_processed = 0;
        self.invalid_packets = 0;
    }
}
