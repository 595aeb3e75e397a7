//! MoldUDP64 packet header.

use zerocopy::byteorder::{BigEndian, U16, U64};
use zerocopy::{AsBytes, FromBytes, FromZeroes, Ref, Unaligned};

/// MoldUDP64 Header (20 bytes)
///
/// ```text
/// ┌──────────────┬────────────────────┬───────────────┐
/// │ session (10) │ sequence_number (8)│ msg count (2) │
/// └──────────────┴────────────────────┴───────────────┘
/// ```
///
/// The session id is ASCII, right-padded with spaces; the sequence number
/// and count are big-endian. A heartbeat is sequence 0 with count 0; the
/// all-ones sequence marks end of session.
#[repr(C)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct MoldHeader {
    pub session: [u8; 10],
    pub sequence_number: U64<BigEndian>,
    pub message_count: U16<BigEndian>,
}

impl MoldHeader {
    /// Header size in bytes; message blocks start at this offset.
    pub const SIZE: usize = 20;

    /// Sequence value marking the end of the session.
    pub const END_OF_SESSION_SEQUENCE: u64 = u64::MAX;

    /// Borrow the header out of a packet. Returns `None` when fewer than
    /// [`MoldHeader::SIZE`] bytes are available.
    pub fn parse(data: &[u8]) -> Option<&MoldHeader> {
        let bytes = data.get(..Self::SIZE)?;
        Some(Ref::<_, MoldHeader>::new_unaligned(bytes)?.into_ref())
    }

    /// First sequence number covered by this packet, host endian.
    #[inline(always)]
    pub fn sequence(&self) -> u64 {
        self.sequence_number.get()
    }

    /// Number of message blocks in this packet, host endian.
    #[inline(always)]
    pub fn count(&self) -> u16 {
        self.message_count.get()
    }

    /// Liveness packet: sequence 0, no messages.
    #[inline(always)]
    pub fn is_heartbeat(&self) -> bool {
        self.sequence() == 0 && self.count() == 0
    }

    /// Terminal packet for the session.
    #[inline(always)]
    pub fn is_end_of_session(&self) -> bool {
        self.sequence() == Self::END_OF_SESSION_SEQUENCE
    }

    /// Session id with trailing padding removed, for logging.
    pub fn session_str(&self) -> &str {
        let end = self
            .session
            .iter()
            .rposition(|&b| b != b' ')
            .map_or(0, |i| i + 1);
        std::str::from_utf8(&self.session[..end]).unwrap_or("<non-ascii>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_header(session: &[u8; 10], seq: u64, count: u16) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(MoldHeader::SIZE);
        bytes.extend_from_slice(session);
        bytes.extend_from_slice(&seq.to_be_bytes());
        bytes.extend_from_slice(&count.to_be_bytes());
        bytes
    }

    #[test]
    fn test_header_size() {
        assert_eq!(std::mem::size_of::<MoldHeader>(), MoldHeader::SIZE);
        assert_eq!(MoldHeader::SIZE, 20);
    }

    #[test]
    fn test_parse_fields() {
        let bytes = raw_header(b"NASDAQ    ", 12_345, 5);
        let header = MoldHeader::parse(&bytes).expect("20 bytes parse");

        assert_eq!(&header.session, b"NASDAQ    ");
        assert_eq!(header.sequence(), 12_345);
        assert_eq!(header.count(), 5);
        assert_eq!(header.session_str(), "NASDAQ");
    }

    #[test]
    fn test_parse_rejects_short_input() {
        let bytes = raw_header(b"NASDAQ    ", 1, 1);
        assert!(MoldHeader::parse(&bytes[..19]).is_none());
        assert!(MoldHeader::parse(&[]).is_none());
    }

    #[test]
    fn test_heartbeat_detection() {
        let hb = raw_header(b"NASDAQ    ", 0, 0);
        assert!(MoldHeader::parse(&hb).unwrap().is_heartbeat());

        // sequence 0 with messages is not a heartbeat
        let not_hb = raw_header(b"NASDAQ    ", 0, 1);
        assert!(!MoldHeader::parse(&not_hb).unwrap().is_heartbeat());
    }

    #[test]
    fn test_end_of_session_detection() {
        let eos = raw_header(b"NASDAQ    ", u64::MAX, 0);
        let header = MoldHeader::parse(&eos).unwrap();
        assert!(header.is_end_of_session());
        assert!(!header.is_heartbeat());
    }
}
