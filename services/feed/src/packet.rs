//! Ethernet / IPv4 / UDP frame walking.
//!
//! Replay captures carry full frames; the live socket path gets bare UDP
//! payloads from the kernel. This module peels the three headers off a
//! frame and hands back the MoldUDP64 payload. Checksums are accepted as
//! verified upstream; only the structural fields are checked.

use zerocopy::byteorder::{BigEndian, U16};
use zerocopy::{AsBytes, FromBytes, FromZeroes, Ref, Unaligned};

type U16be = U16<BigEndian>;

pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const IP_PROTO_UDP: u8 = 17;

/// Ethernet II header (14 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct EthernetHeader {
    pub dst_mac: [u8; 6],
    pub src_mac: [u8; 6],
    pub ether_type: U16be,
}

/// IPv4 header, fixed 20-byte prefix; options are skipped via the IHL.
#[repr(C)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct Ipv4Header {
    /// Version in the high nibble, header length in 32-bit words in the low.
    pub version_ihl: u8,
    pub tos: u8,
    pub total_length: U16be,
    pub identification: U16be,
    pub flags_fragment: U16be,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: U16be,
    pub src_addr: [u8; 4],
    pub dst_addr: [u8; 4],
}

impl Ipv4Header {
    /// Header length in bytes, from the low nibble of the first byte.
    #[inline(always)]
    pub fn header_len(&self) -> usize {
        usize::from(self.version_ihl & 0x0F) * 4
    }
}

/// UDP header (8 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct UdpHeader {
    pub src_port: U16be,
    pub dst_port: U16be,
    pub length: U16be,
    pub checksum: U16be,
}

fn header_at<'a, T: FromBytes + Unaligned>(data: &'a [u8], offset: usize) -> Option<&'a T> {
    let bytes = data.get(offset..offset + std::mem::size_of::<T>())?;
    Some(Ref::<_, T>::new_unaligned(bytes)?.into_ref())
}

/// Extract the UDP payload from a full Ethernet frame.
///
/// Returns `None` for anything that is not IPv4/UDP or is too short for
/// its own headers; the caller counts those as invalid packets.
pub fn udp_payload(frame: &[u8]) -> Option<&[u8]> {
    let eth: &EthernetHeader = header_at(frame, 0)?;
    if eth.ether_type.get() != ETHERTYPE_IPV4 {
        return None;
    }
    let mut offset = std::mem::size_of::<EthernetHeader>();

    let ip: &Ipv4Header = header_at(frame, offset)?;
    if ip.protocol != IP_PROTO_UDP {
        return None;
    }
    let ihl = ip.header_len();
    if ihl < std::mem::size_of::<Ipv4Header>() {
        return None;
    }
    offset += ihl;

    let _udp: &UdpHeader = header_at(frame, offset)?;
    offset += std::mem::size_of::<UdpHeader>();

    frame.get(offset..)
}
