//! MoldUDP64 session state machine.
//!
//! Single-threaded by design: the session runs inside the producer thread
//! and holds no locks. The only outputs are sink calls (messages in wire
//! order, gap notifications) and counters.

use tracing::{debug, info, warn};

use feed_types::wall_clock_ns;

use crate::header::MoldHeader;

/// A contiguous range of missing sequence numbers, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    /// First missing sequence number.
    pub start: u64,
    /// Last missing sequence number.
    pub end: u64,
    /// Wall-clock nanoseconds at detection, for retransmission timeouts.
    pub detected_at_ns: u64,
}

impl Gap {
    /// Number of missing sequence numbers.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No packets received yet.
    Unknown,
    /// Sequenced and complete.
    Active,
    /// At least one gap outstanding, waiting for retransmission.
    Stale,
    /// End-of-session marker received. Terminal.
    EndOfSession,
    /// Session id mismatch. Terminal.
    Error,
}

/// Receiver for sequenced messages and gap notifications.
pub trait SessionSink {
    /// One ITCH message, in wire order. `payload` aliases the packet
    /// buffer and must not be retained past the call.
    ///
    /// Return `false` to stop emission for the remainder of the packet,
    /// e.g. when the payload failed to decode and the rest of the packet
    /// is no longer trustworthy. Messages already emitted stand.
    fn on_message(&mut self, payload: &[u8], sequence: u64) -> bool;

    /// A freshly detected gap. Fired once per gap, before the packet that
    /// revealed it is emitted.
    fn on_gap(&mut self, _gap: &Gap) {}
}

/// Session counters. Owned by the producer thread; snapshot from there or
/// after joining.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SessionStats {
    pub packets_received: u64,
    pub messages_received: u64,
    pub gaps_detected: u64,
    pub heartbeats_received: u64,
    /// Packets rejected before sequencing: short header, or arrival in a
    /// terminal state.
    pub invalid_packets: u64,
}

/// MoldUDP64 session tracker.
///
/// The first valid packet latches the session id; every later packet must
/// carry the same id or the session enters [`SessionState::Error`] and
/// stops emitting. `expected_seq` starts at 1 and only moves forward:
/// it advances to `first_seq + count` whenever that exceeds its current
/// value. The only rewind primitive is [`Session::reset`].
pub struct Session {
    session_id: [u8; 10],
    expected_seq: u64,
    state: SessionState,
    pending_gaps: Vec<Gap>,
    stats: SessionStats,
}

impl Session {
    pub fn new() -> Self {
        Session {
            session_id: [0; 10],
            expected_seq: 1,
            state: SessionState::Unknown,
            pending_gaps: Vec::new(),
            stats: SessionStats::default(),
        }
    }

    /// Process one complete MoldUDP64 UDP payload.
    ///
    /// Emits every embedded message through `sink` in wire order; the i-th
    /// block carries sequence `first_seq + i`. Returns `false` when the
    /// packet was rejected whole (short header, terminal state, or session
    /// id mismatch); truncation inside the block list is not a rejection —
    /// the already-emitted messages stand and the packet still counts.
    pub fn process_packet<S: SessionSink>(&mut self, data: &[u8], sink: &mut S) -> bool {
        let Some(header) = MoldHeader::parse(data) else {
            self.stats.invalid_packets += 1;
            return false;
        };

        if matches!(self.state, SessionState::EndOfSession | SessionState::Error) {
            self.stats.invalid_packets += 1;
            debug!(state = ?self.state, "packet after terminal state dropped");
            return false;
        }

        self.stats.packets_received += 1;

        if self.state == SessionState::Unknown {
            // First packet establishes the session id.
            self.session_id = header.session;
            self.state = SessionState::Active;
            info!(session = header.session_str(), "session established");
        } else if self.session_id != header.session {
            warn!(
                expected = std::str::from_utf8(&self.session_id).unwrap_or("<non-ascii>"),
                got = header.session_str(),
                "session id mismatch"
            );
            self.state = SessionState::Error;
            return false;
        }

        if header.is_heartbeat() {
            self.stats.heartbeats_received += 1;
            return true;
        }

        if header.is_end_of_session() {
            info!(
                session = header.session_str(),
                expected_seq = self.expected_seq,
                "end of session"
            );
            self.state = SessionState::EndOfSession;
            return true;
        }

        let first_seq = header.sequence();
        let count = header.count();

        if first_seq > self.expected_seq {
            let gap = Gap {
                start: self.expected_seq,
                end: first_seq - 1,
                detected_at_ns: wall_clock_ns(),
            };
            warn!(
                start = gap.start,
                end = gap.end,
                missing = gap.len(),
                "sequence gap detected"
            );
            self.pending_gaps.push(gap);
            self.stats.gaps_detected += 1;
            self.state = SessionState::Stale;
            sink.on_gap(&gap);
        } else if first_seq < self.expected_seq && count > 0 {
            // Duplicate or retransmission; it may close out pending gaps.
            // The messages are still emitted below.
            self.fill_gaps(first_seq, first_seq + u64::from(count) - 1);
        }

        self.emit_blocks(&data[MoldHeader::SIZE..], first_seq, count, sink);

        let next_expected = first_seq + u64::from(count);
        if next_expected > self.expected_seq {
            self.expected_seq = next_expected;
        }

        if self.state == SessionState::Stale && self.pending_gaps.is_empty() {
            info!("all gaps healed, session active");
            self.state = SessionState::Active;
        }

        true
    }

    /// Ingest a retransmission buffer: `count` length-prefixed blocks with
    /// no MoldUDP64 header, starting at `start_seq`.
    ///
    /// Applies gap fill and emits the messages; never advances
    /// `expected_seq` — retransmissions are strictly backfill.
    pub fn process_retransmission<S: SessionSink>(
        &mut self,
        start_seq: u64,
        data: &[u8],
        count: u16,
        sink: &mut S,
    ) {
        if count > 0 {
            self.fill_gaps(start_seq, start_seq + u64::from(count) - 1);
        }

        self.emit_blocks(data, start_seq, count, sink);

        if self.state == SessionState::Stale && self.pending_gaps.is_empty() {
            info!("all gaps healed, session active");
            self.state = SessionState::Active;
        }
    }

    /// Walk up to `count` length-prefixed blocks, emitting each message
    /// with its sequence number. Stops silently when fewer than 2 bytes
    /// remain, when a declared length runs past the buffer, or when the
    /// sink rejects a block.
    fn emit_blocks<S: SessionSink>(
        &mut self,
        mut blocks: &[u8],
        first_seq: u64,
        count: u16,
        sink: &mut S,
    ) {
        let mut seq = first_seq;
        for _ in 0..count {
            if blocks.len() < 2 {
                break;
            }
            let msg_len = usize::from(u16::from_be_bytes([blocks[0], blocks[1]]));
            blocks = &blocks[2..];
            if blocks.len() < msg_len {
                break;
            }

            let keep_going = sink.on_message(&blocks[..msg_len], seq);
            self.stats.messages_received += 1;
            if !keep_going {
                break;
            }

            blocks = &blocks[msg_len..];
            seq += 1;
        }
    }

    /// Shrink or remove pending gaps covered by the received range
    /// `[start, end]`.
    ///
    /// Retransmissions cover a prefix or suffix of a known gap (or all of
    /// it); a range strictly inside a gap would split it, which the wire
    /// protocol does not produce — such a range leaves the gap untouched.
    fn fill_gaps(&mut self, start: u64, end: u64) {
        self.pending_gaps.retain_mut(|gap| {
            if start <= gap.start && end >= gap.end {
                debug!(start = gap.start, end = gap.end, "gap fully filled");
                false
            } else if start <= gap.start && end >= gap.start {
                // Prefix covered; e < gap.end here, so the range stays valid.
                gap.start = end + 1;
                true
            } else if start <= gap.end && end >= gap.end {
                // Suffix covered; start > gap.start here.
                gap.end = start - 1;
                true
            } else if start > gap.start && end < gap.end {
                warn!(
                    gap_start = gap.start,
                    gap_end = gap.end,
                    fill_start = start,
                    fill_end = end,
                    "interior retransmission ignored, gap left open"
                );
                true
            } else {
                true
            }
        });
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn expected_sequence(&self) -> u64 {
        self.expected_seq
    }

    pub fn session_id(&self) -> &[u8; 10] {
        &self.session_id
    }

    pub fn pending_gaps(&self) -> &[Gap] {
        &self.pending_gaps
    }

    pub fn has_gaps(&self) -> bool {
        !self.pending_gaps.is_empty()
    }

    /// Sequenced, gap-free, and not terminated.
    pub fn is_healthy(&self) -> bool {
        self.state == SessionState::Active && self.pending_gaps.is_empty()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Forget everything: state back to `Unknown`, expected sequence back
    /// to 1, gaps and counters cleared.
    pub fn reset(&mut self) {
        self.session_id = [0; 10];
        self.expected_seq = 1;
        self.state = SessionState::Unknown;
        self.pending_gaps.clear();
        self.stats = SessionStats::default();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION: &[u8; 10] = b"NASDAQ    ";

    /// Sink recording emissions and gap callbacks.
    #[derive(Default)]
    struct Recorder {
        messages: Vec<(Vec<u8>, u64)>,
        gaps: Vec<Gap>,
    }

    impl SessionSink for Recorder {
        fn on_message(&mut self, payload: &[u8], sequence: u64) -> bool {
            self.messages.push((payload.to_vec(), sequence));
            true
        }

        fn on_gap(&mut self, gap: &Gap) {
            self.gaps.push(*gap);
        }
    }

    /// Build a MoldUDP64 packet with the given message payloads.
    fn packet<M: AsRef<[u8]>>(session: &[u8; 10], first_seq: u64, messages: &[M]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(session);
        bytes.extend_from_slice(&first_seq.to_be_bytes());
        bytes.extend_from_slice(&(messages.len() as u16).to_be_bytes());
        for msg in messages {
            let msg = msg.as_ref();
            bytes.extend_from_slice(&(msg.len() as u16).to_be_bytes());
            bytes.extend_from_slice(msg);
        }
        bytes
    }

    /// Header-only packet: heartbeat (sequence 0) or end-of-session.
    fn control_packet(session: &[u8; 10], sequence: u64) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(session);
        bytes.extend_from_slice(&sequence.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes
    }

    /// Length-prefixed blocks without a header, for retransmissions.
    fn blocks<M: AsRef<[u8]>>(messages: &[M]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for msg in messages {
            let msg = msg.as_ref();
            bytes.extend_from_slice(&(msg.len() as u16).to_be_bytes());
            bytes.extend_from_slice(msg);
        }
        bytes
    }

    #[test]
    fn test_initial_state() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Unknown);
        assert_eq!(session.expected_sequence(), 1);
        assert!(!session.has_gaps());
    }

    #[test]
    fn test_contiguous_stream_stays_active() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        assert!(session.process_packet(&packet(SESSION, 1, &[b"aa", b"bb"]), &mut sink));
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.expected_sequence(), 3);

        assert!(session.process_packet(&packet(SESSION, 3, &[b"cc", b"dd"]), &mut sink));
        assert_eq!(session.expected_sequence(), 5);
        assert!(sink.gaps.is_empty());

        let seqs: Vec<u64> = sink.messages.iter().map(|(_, s)| *s).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4]);
        assert_eq!(sink.messages[0].0, b"aa");
        assert_eq!(session.stats().messages_received, 4);
    }

    #[test]
    fn test_gap_detection() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        session.process_packet(&packet(SESSION, 1, &[b"m1"]), &mut sink);
        session.process_packet(&packet(SESSION, 5, &[b"m5"]), &mut sink);

        assert_eq!(session.state(), SessionState::Stale);
        assert_eq!(sink.gaps.len(), 1);
        assert_eq!(sink.gaps[0].start, 2);
        assert_eq!(sink.gaps[0].end, 4);
        assert_eq!(sink.gaps[0].len(), 3);
        assert!(sink.gaps[0].detected_at_ns > 0);
        assert_eq!(session.stats().gaps_detected, 1);

        // the packet past the gap is still emitted and advances the cursor
        assert_eq!(session.expected_sequence(), 6);
        assert_eq!(sink.messages.len(), 2);
    }

    #[test]
    fn test_gap_heals_through_retransmission() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        session.process_packet(&packet(SESSION, 1, &[b"m1"]), &mut sink);
        session.process_packet(&packet(SESSION, 5, &[b"m5"]), &mut sink);
        assert_eq!(session.state(), SessionState::Stale);

        let retrans = blocks(&[b"m2", b"m3", b"m4"]);
        session.process_retransmission(2, &retrans, 3, &mut sink);

        assert!(!session.has_gaps());
        assert_eq!(session.state(), SessionState::Active);
        // backfill never advances the cursor
        assert_eq!(session.expected_sequence(), 6);

        let seqs: Vec<u64> = sink.messages.iter().map(|(_, s)| *s).collect();
        assert_eq!(seqs, vec![1, 5, 2, 3, 4]);
    }

    #[test]
    fn test_partial_fill_shrinks_gap() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        session.process_packet(&packet(SESSION, 1, &[b"m1"]), &mut sink);
        session.process_packet(&packet(SESSION, 10, &[b"m10"]), &mut sink);
        assert_eq!(session.pending_gaps(), &[Gap {
            start: 2,
            end: 9,
            detected_at_ns: session.pending_gaps()[0].detected_at_ns,
        }]);

        // prefix fill: 2..=4
        session.process_retransmission(2, &blocks(&[b"a", b"b", b"c"]), 3, &mut sink);
        assert_eq!(session.pending_gaps()[0].start, 5);
        assert_eq!(session.pending_gaps()[0].end, 9);
        assert_eq!(session.state(), SessionState::Stale);

        // suffix fill: 8..=9
        session.process_retransmission(8, &blocks(&[b"d", b"e"]), 2, &mut sink);
        assert_eq!(session.pending_gaps()[0].start, 5);
        assert_eq!(session.pending_gaps()[0].end, 7);

        // remaining middle: 5..=7
        session.process_retransmission(5, &blocks(&[b"f", b"g", b"h"]), 3, &mut sink);
        assert!(!session.has_gaps());
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn test_interior_fill_leaves_gap_open() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        session.process_packet(&packet(SESSION, 1, &[b"m1"]), &mut sink);
        session.process_packet(&packet(SESSION, 10, &[b"m10"]), &mut sink);

        // covers 4..=6, strictly inside the 2..=9 gap
        session.process_retransmission(4, &blocks(&[b"x", b"y", b"z"]), 3, &mut sink);

        assert_eq!(session.pending_gaps().len(), 1);
        assert_eq!(session.pending_gaps()[0].start, 2);
        assert_eq!(session.pending_gaps()[0].end, 9);
        assert_eq!(session.state(), SessionState::Stale);
        // the messages themselves are still emitted
        let seqs: Vec<u64> = sink.messages.iter().map(|(_, s)| *s).collect();
        assert_eq!(seqs, vec![1, 10, 4, 5, 6]);
    }

    #[test]
    fn test_heartbeat_changes_nothing() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        session.process_packet(&packet(SESSION, 1, &[b"m1"]), &mut sink);
        let expected = session.expected_sequence();
        let state = session.state();

        assert!(session.process_packet(&control_packet(SESSION, 0), &mut sink));

        assert_eq!(session.expected_sequence(), expected);
        assert_eq!(session.state(), state);
        assert!(!session.has_gaps());
        assert_eq!(session.stats().heartbeats_received, 1);
        assert_eq!(sink.messages.len(), 1);
    }

    #[test]
    fn test_heartbeat_establishes_session_id() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        assert!(session.process_packet(&control_packet(SESSION, 0), &mut sink));
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.session_id(), SESSION);
    }

    #[test]
    fn test_duplicate_packet_absorbed() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        session.process_packet(&packet(SESSION, 1, &[b"m1", b"m2"]), &mut sink);
        assert_eq!(session.expected_sequence(), 3);

        // exact duplicate: re-emitted (retransmission path), no gap, no
        // cursor movement
        session.process_packet(&packet(SESSION, 1, &[b"m1", b"m2"]), &mut sink);
        assert_eq!(session.expected_sequence(), 3);
        assert!(!session.has_gaps());
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(sink.messages.len(), 4);
        assert_eq!(session.stats().gaps_detected, 0);
    }

    #[test]
    fn test_end_of_session_is_terminal() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        session.process_packet(&packet(SESSION, 1, &[b"m1"]), &mut sink);
        assert!(session.process_packet(&control_packet(SESSION, u64::MAX), &mut sink));
        assert_eq!(session.state(), SessionState::EndOfSession);

        // nothing gets through afterwards
        assert!(!session.process_packet(&packet(SESSION, 2, &[b"m2"]), &mut sink));
        assert_eq!(sink.messages.len(), 1);
        assert_eq!(session.state(), SessionState::EndOfSession);
    }

    #[test]
    fn test_session_id_mismatch_is_fatal() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        session.process_packet(&packet(SESSION, 1, &[b"m1"]), &mut sink);
        assert!(!session.process_packet(&packet(b"OTHER     ", 2, &[b"m2"]), &mut sink));
        assert_eq!(session.state(), SessionState::Error);

        // even the original session is rejected now
        assert!(!session.process_packet(&packet(SESSION, 2, &[b"m2"]), &mut sink));
        assert_eq!(sink.messages.len(), 1);
    }

    #[test]
    fn test_truncated_header_rejected() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        assert!(!session.process_packet(&[0u8; 10], &mut sink));
        assert_eq!(session.state(), SessionState::Unknown);
        assert_eq!(session.stats().packets_received, 0);
        assert_eq!(session.stats().invalid_packets, 1);
    }

    #[test]
    fn test_truncated_trailing_block() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        // declare 3 messages but only append two complete blocks
        let mut bytes = Vec::new();
        bytes.extend_from_slice(SESSION);
        bytes.extend_from_slice(&1u64.to_be_bytes());
        bytes.extend_from_slice(&3u16.to_be_bytes());
        for msg in [&b"m1"[..], &b"m2"[..]] {
            bytes.extend_from_slice(&(msg.len() as u16).to_be_bytes());
            bytes.extend_from_slice(msg);
        }

        assert!(session.process_packet(&bytes, &mut sink));
        assert_eq!(sink.messages.len(), 2);
        // the declared count still advances the cursor
        assert_eq!(session.expected_sequence(), 4);
        assert_eq!(session.stats().packets_received, 1);
    }

    #[test]
    fn test_block_length_past_packet_end() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        let mut bytes = Vec::new();
        bytes.extend_from_slice(SESSION);
        bytes.extend_from_slice(&1u64.to_be_bytes());
        bytes.extend_from_slice(&2u16.to_be_bytes());
        // first block complete
        bytes.extend_from_slice(&2u16.to_be_bytes());
        bytes.extend_from_slice(b"ok");
        // second block declares 100 bytes but carries 3
        bytes.extend_from_slice(&100u16.to_be_bytes());
        bytes.extend_from_slice(b"eh?");

        assert!(session.process_packet(&bytes, &mut sink));
        assert_eq!(sink.messages.len(), 1);
        assert_eq!(sink.messages[0].0, b"ok");
    }

    #[test]
    fn test_sink_rejection_stops_packet() {
        /// Rejects payloads starting with `!`.
        #[derive(Default)]
        struct Picky {
            accepted: Vec<u64>,
        }

        impl SessionSink for Picky {
            fn on_message(&mut self, payload: &[u8], sequence: u64) -> bool {
                if payload.starts_with(b"!") {
                    return false;
                }
                self.accepted.push(sequence);
                true
            }
        }

        let mut session = Session::new();
        let mut sink = Picky::default();

        session.process_packet(&packet(SESSION, 1, &[b"ok", b"!x", b"ok"]), &mut sink);

        // emission stopped at the rejected block; the cursor still
        // advances by the declared count
        assert_eq!(sink.accepted, vec![1]);
        assert_eq!(session.expected_sequence(), 4);
        assert_eq!(session.stats().messages_received, 2);
    }

    #[test]
    fn test_reset() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        session.process_packet(&packet(SESSION, 1, &[b"m1"]), &mut sink);
        session.process_packet(&packet(SESSION, 5, &[b"m5"]), &mut sink);
        assert!(session.has_gaps());

        session.reset();
        assert_eq!(session.state(), SessionState::Unknown);
        assert_eq!(session.expected_sequence(), 1);
        assert!(!session.has_gaps());
        assert_eq!(session.stats(), &SessionStats::default());
    }

    #[test]
    fn test_is_healthy() {
        let mut session = Session::new();
        let mut sink = Recorder::default();

        assert!(!session.is_healthy());
        session.process_packet(&packet(SESSION, 1, &[b"m1"]), &mut sink);
        assert!(session.is_healthy());
        session.process_packet(&packet(SESSION, 5, &[b"m5"]), &mut sink);
        assert!(!session.is_healthy());
    }
}
