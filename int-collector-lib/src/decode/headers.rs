//! Fixed-layout headers of an INT report, in wire order.
//!
//! ```text
//! [Report 16B][Ethernet 14B][IPv4 20B][UDP 8B][Shim 4B][IntMeta 8B][hops...]
//! ```
//!
//! Decoders are purely structural: no checksum, version or length field is
//! validated. The only failure is a span that does not fit in the buffer.

use std::net::Ipv4Addr;

use super::bits::BitCursor;
use super::error::DecodeError;

/// A header with a fixed byte size whose fields are read MSB-first.
pub trait WireHeader: Sized {
    const NAME: &'static str;
    /// Size on the wire in bytes.
    const SIZE: usize;

    fn read_fields(cursor: &mut BitCursor<'_>) -> Result<Self, DecodeError>;

    /// Decode the header at `offset`, returning it with the offset just past it.
    fn decode(buf: &[u8], offset: usize) -> Result<(Self, usize), DecodeError> {
        let span = offset
            .checked_add(Self::SIZE)
            .and_then(|end| buf.get(offset..end))
            .ok_or(DecodeError::BufferUnderrun {
                what: Self::NAME,
                offset,
                needed: Self::SIZE,
                available: buf.len().saturating_sub(offset),
            })?;

        let mut cursor = BitCursor::new(span);
        let header = Self::read_fields(&mut cursor)?;
        debug_assert_eq!(cursor.remaining(), 0, "{} layout does not fill its span", Self::NAME);

        Ok((header, offset + Self::SIZE))
    }
}

/// `int_report_fixed_header_t` prepended by the exporting switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportFixedHeader {
    pub ver: u8,
    pub len: u8,
    pub nproto: u8,
    pub rep_md_bits: u8,
    pub rsvd: u8,
    /// Dropped.
    pub d: bool,
    /// Congested queue association.
    pub q: bool,
    /// Tracked flow.
    pub f: bool,
    pub hw_id: u8,
    pub sw_id: u32,
    pub seq_no: u32,
    pub ingress_tstamp: u32,
}

impl WireHeader for ReportFixedHeader {
    const NAME: &'static str = "report";
    const SIZE: usize = 16;

    fn read_fields(c: &mut BitCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            ver: c.read_u8(4)?,
            len: c.read_u8(4)?,
            nproto: c.read_u8(3)?,
            rep_md_bits: c.read_u8(6)?,
            rsvd: c.read_u8(6)?,
            d: c.read_flag()?,
            q: c.read_flag()?,
            f: c.read_flag()?,
            hw_id: c.read_u8(6)?,
            sw_id: c.read_u32(32)?,
            seq_no: c.read_u32(32)?,
            ingress_tstamp: c.read_u32(32)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EthernetHeader {
    /// 48-bit address in the low bits.
    pub dst_addr: u64,
    pub src_addr: u64,
    pub ether_type: u16,
}

impl EthernetHeader {
    pub fn dst_mac(&self) -> [u8; 6] {
        mac_bytes(self.dst_addr)
    }

    pub fn src_mac(&self) -> [u8; 6] {
        mac_bytes(self.src_addr)
    }
}

fn mac_bytes(addr: u64) -> [u8; 6] {
    let b = addr.to_be_bytes();
    [b[2], b[3], b[4], b[5], b[6], b[7]]
}

impl WireHeader for EthernetHeader {
    const NAME: &'static str = "ethernet";
    const SIZE: usize = 14;

    fn read_fields(c: &mut BitCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self { dst_addr: c.read(48)?, src_addr: c.read(48)?, ether_type: c.read_u16(16)? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ipv4Header {
    pub version: u8,
    pub ihl: u8,
    pub dscp: u8,
    pub ecn: u8,
    pub length: u16,
    pub identification: u16,
    pub flags: u8,
    pub frag_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub hdr_checksum: u16,
    pub src_addr: u32,
    pub dst_addr: u32,
}

impl Ipv4Header {
    pub fn src_ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.src_addr)
    }

    pub fn dst_ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.dst_addr)
    }
}

impl WireHeader for Ipv4Header {
    const NAME: &'static str = "ipv4";
    const SIZE: usize = 20;

    fn read_fields(c: &mut BitCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            version: c.read_u8(4)?,
            ihl: c.read_u8(4)?,
            dscp: c.read_u8(6)?,
            ecn: c.read_u8(2)?,
            length: c.read_u16(16)?,
            identification: c.read_u16(16)?,
            flags: c.read_u8(3)?,
            frag_offset: c.read_u16(13)?,
            ttl: c.read_u8(8)?,
            protocol: c.read_u8(8)?,
            hdr_checksum: c.read_u16(16)?,
            src_addr: c.read_u32(32)?,
            dst_addr: c.read_u32(32)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub length: u16,
    pub checksum: u16,
}

impl WireHeader for UdpHeader {
    const NAME: &'static str = "udp";
    const SIZE: usize = 8;

    fn read_fields(c: &mut BitCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            src_port: c.read_u16(16)?,
            dst_port: c.read_u16(16)?,
            length: c.read_u16(16)?,
            checksum: c.read_u16(16)?,
        })
    }
}

/// INT shim header. `len` counts 4-byte words of shim, metadata header and hop stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShimHeader {
    pub int_type: u8,
    pub rsvd1: u8,
    pub len: u8,
    pub dscp: u8,
    pub rsvd2: u8,
}

impl WireHeader for ShimHeader {
    const NAME: &'static str = "shim";
    const SIZE: usize = 4;

    fn read_fields(c: &mut BitCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            int_type: c.read_u8(8)?,
            rsvd1: c.read_u8(8)?,
            len: c.read_u8(8)?,
            dscp: c.read_u8(6)?,
            rsvd2: c.read_u8(2)?,
        })
    }
}

/// INT metadata header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntMetaHeader {
    pub ver: u8,
    pub rep: u8,
    /// Copy.
    pub c: bool,
    /// Max hop count exceeded.
    pub e: bool,
    /// MTU exceeded.
    pub m: bool,
    pub rsvd1: u8,
    pub rsvd2: u8,
    /// Words of metadata pushed by each hop.
    pub hop_metadata_len: u8,
    pub remaining_hop_cnt: u8,
    pub instruction_mask_0003: u8,
    pub instruction_mask_0407: u8,
    pub instruction_mask_0811: u8,
    pub instruction_mask_1215: u8,
    pub rsvd3: u16,
}

impl IntMetaHeader {
    /// The four instruction nibbles joined back into the 16-bit bitmap.
    pub fn instruction_bitmap(&self) -> u16 {
        u16::from(self.instruction_mask_0003) << 12
            | u16::from(self.instruction_mask_0407) << 8
            | u16::from(self.instruction_mask_0811) << 4
            | u16::from(self.instruction_mask_1215)
    }
}

impl WireHeader for IntMetaHeader {
    const NAME: &'static str = "int_meta";
    const SIZE: usize = 8;

    fn read_fields(c: &mut BitCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            ver: c.read_u8(4)?,
            rep: c.read_u8(2)?,
            c: c.read_flag()?,
            e: c.read_flag()?,
            m: c.read_flag()?,
            rsvd1: c.read_u8(7)?,
            rsvd2: c.read_u8(3)?,
            hop_metadata_len: c.read_u8(5)?,
            remaining_hop_cnt: c.read_u8(8)?,
            instruction_mask_0003: c.read_u8(4)?,
            instruction_mask_0407: c.read_u8(4)?,
            instruction_mask_0811: c.read_u8(4)?,
            instruction_mask_1215: c.read_u8(4)?,
            rsvd3: c.read_u16(16)?,
        })
    }
}
