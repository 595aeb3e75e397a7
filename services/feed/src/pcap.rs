//! pcap capture reading.
//!
//! Classic pcap only: a 24-byte global header whose magic is either
//! `0xA1B2C3D4` (writer's native byte order matches ours) or `0xD4C3B2A1`
//! (every header field byte-swapped), then 16-byte record headers with the
//! captured length. Records carry full Ethernet frames.
//!
//! The whole file is mapped into one buffer by the caller; the reader just
//! walks it. A record running past the end of the buffer ends iteration,
//! matching how a capture truncated mid-write is normally handled.

use crate::error::FeedError;

const GLOBAL_HEADER_LEN: usize = 24;
const RECORD_HEADER_LEN: usize = 16;

const MAGIC_NATIVE: u32 = 0xA1B2_C3D4;
const MAGIC_SWAPPED: u32 = 0xD4C3_B2A1;

/// One pcap record: capture timestamp plus the captured frame bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcapRecord<'a> {
    pub ts_sec: u32,
    pub ts_usec: u32,
    /// Original frame length on the wire; `frame.len()` may be smaller if
    /// the capture used a snap length.
    pub orig_len: u32,
    pub frame: &'a [u8],
}

/// Iterator-style reader over an in-memory pcap file.
pub struct PcapReader<'a> {
    data: &'a [u8],
    offset: usize,
    swapped: bool,
}

impl<'a> PcapReader<'a> {
    /// Validate the global header and position at the first record.
    pub fn new(data: &'a [u8]) -> Result<Self, FeedError> {
        if data.len() < GLOBAL_HEADER_LEN {
            return Err(FeedError::TruncatedPcapHeader { got: data.len() });
        }

        let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let swapped = match magic {
            MAGIC_NATIVE => false,
            MAGIC_SWAPPED => true,
            other => return Err(FeedError::InvalidPcapMagic { found: other }),
        };

        Ok(PcapReader {
            data,
            offset: GLOBAL_HEADER_LEN,
            swapped,
        })
    }

    #[inline]
    fn read_u32(&self, offset: usize) -> u32 {
        let bytes = [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ];
        if self.swapped {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        }
    }

    /// Next record, or `None` at end of file / on a truncated tail.
    pub fn next_record(&mut self) -> Option<PcapRecord<'a>> {
        if self.offset + RECORD_HEADER_LEN > self.data.len() {
            return None;
        }

        let ts_sec = self.read_u32(self.offset);
        let ts_usec = self.read_u32(self.offset + 4);
        let incl_len = self.read_u32(self.offset + 8) as usize;
        let orig_len = self.read_u32(self.offset + 12);

        let start = self.offset + RECORD_HEADER_LEN;
        let end = start.checked_add(incl_len)?;
        if end > self.data.len() {
            return None;
        }

        self.offset = end;
        Some(PcapRecord {
            ts_sec,
            ts_usec,
            orig_len,
            frame: &self.data[start..end],
        })
    }
}

/// Serialize a pcap file from frames. Test and tooling helper; always
/// writes the native-order magic.
pub fn write_pcap(frames: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC_NATIVE.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes()); // version major
    out.extend_from_slice(&4u16.to_le_bytes()); // version minor
    out.extend_from_slice(&0i32.to_le_bytes()); // thiszone
    out.extend_from_slice(&0u32.to_le_bytes()); // sigfigs
    out.extend_from_slice(&65_535u32.to_le_bytes()); // snaplen
    out.extend_from_slice(&1u32.to_le_bytes()); // linktype: ethernet

    for frame in frames {
        out.extend_from_slice(&0u32.to_le_bytes()); // ts_sec
        out.extend_from_slice(&0u32.to_le_bytes()); // ts_usec
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(frame);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_native_order_records() {
        let file = write_pcap(&[b"frame-one".as_slice(), b"frame-two!".as_slice()]);
        let mut reader = PcapReader::new(&file).expect("valid magic");

        let first = reader.next_record().unwrap();
        assert_eq!(first.frame, b"frame-one");
        assert_eq!(first.orig_len, 9);

        let second = reader.next_record().unwrap();
        assert_eq!(second.frame, b"frame-two!");

        assert!(reader.next_record().is_none());
    }

    #[test]
    fn test_reads_swapped_order_records() {
        // hand-build a byte-swapped file
        let mut file = Vec::new();
        file.extend_from_slice(&MAGIC_NATIVE.to_be_bytes()); // reads back as swapped
        file.extend_from_slice(&2u16.to_be_bytes());
        file.extend_from_slice(&4u16.to_be_bytes());
        file.extend_from_slice(&[0; 12]);
        file.extend_from_slice(&7u32.to_be_bytes()); // ts_sec
        file.extend_from_slice(&8u32.to_be_bytes()); // ts_usec
        file.extend_from_slice(&3u32.to_be_bytes()); // incl_len
        file.extend_from_slice(&3u32.to_be_bytes()); // orig_len
        file.extend_from_slice(b"abc");

        let mut reader = PcapReader::new(&file).expect("swapped magic accepted");
        let rec = reader.next_record().unwrap();
        assert_eq!(rec.ts_sec, 7);
        assert_eq!(rec.ts_usec, 8);
        assert_eq!(rec.frame, b"abc");
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut file = write_pcap(&[]);
        file[0] = 0xEE;
        match PcapReader::new(&file) {
            Err(FeedError::InvalidPcapMagic { .. }) => {}
            other => panic!("expected InvalidPcapMagic, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_rejects_short_global_header() {
        match PcapReader::new(&[0u8; 10]) {
            Err(FeedError::TruncatedPcapHeader { got: 10 }) => {}
            other => panic!("expected TruncatedPcapHeader, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_truncated_record_ends_iteration() {
        let mut file = write_pcap(&[b"complete"]);
        // append a record header claiming 100 bytes with only 3 present
        file.extend_from_slice(&[0; 8]);
        file.extend_from_slice(&100u32.to_le_bytes());
        file.extend_from_slice(&100u32.to_le_bytes());
        file.extend_from_slice(b"eh?");

        let mut reader = PcapReader::new(&file).unwrap();
        assert_eq!(reader.next_record().unwrap().frame, b"complete");
        assert!(reader.next_record().is_none());
    }
}
