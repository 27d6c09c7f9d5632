use tracing::warn;

use super::error::DecodeError;
use super::headers::{
    EthernetHeader, IntMetaHeader, Ipv4Header, ReportFixedHeader, ShimHeader, UdpHeader,
    WireHeader,
};
use super::hop::RECORD_WORDS;
use super::trace::Traced;
use crate::config::{DecodeConfig, HopSource};

/// Bytes taken by the six fixed headers (560 bits).
pub const FIXED_HEADERS_SIZE: usize = ReportFixedHeader::SIZE
    + EthernetHeader::SIZE
    + Ipv4Header::SIZE
    + UdpHeader::SIZE
    + ShimHeader::SIZE
    + IntMetaHeader::SIZE;

/// Shim and INT metadata header, in 4-byte words, as counted by `ShimHeader::len`.
const SHIM_AND_META_WORDS: usize = (ShimHeader::SIZE + IntMetaHeader::SIZE) / 4;

/// The fixed headers of one INT report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntReport {
    pub report: ReportFixedHeader,
    pub ethernet: EthernetHeader,
    pub ipv4: Ipv4Header,
    pub udp: UdpHeader,
    pub shim: ShimHeader,
    pub int_meta: IntMetaHeader,
}

impl IntReport {
    /// Decode Report, Ethernet, IPv4, UDP, Shim and IntMeta in order.
    ///
    /// Returns the headers and the offset of the first hop record.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), DecodeError> {
        Self::decode_traced(buf, false)
    }

    /// Same as [`IntReport::decode`], emitting one trace event per header as
    /// soon as it is decoded when `trace` is set.
    pub fn decode_traced(buf: &[u8], trace: bool) -> Result<(Self, usize), DecodeError> {
        let (report, offset) = step::<ReportFixedHeader>(buf, 0, trace)?;
        let (ethernet, offset) = step::<EthernetHeader>(buf, offset, trace)?;
        let (ipv4, offset) = step::<Ipv4Header>(buf, offset, trace)?;
        let (udp, offset) = step::<UdpHeader>(buf, offset, trace)?;
        let (shim, offset) = step::<ShimHeader>(buf, offset, trace)?;
        let (int_meta, offset) = step::<IntMetaHeader>(buf, offset, trace)?;
        debug_assert_eq!(offset, FIXED_HEADERS_SIZE);

        Ok((Self { report, ethernet, ipv4, udp, shim, int_meta }, offset))
    }
}

fn step<H: WireHeader + Traced>(
    buf: &[u8],
    offset: usize,
    trace: bool,
) -> Result<(H, usize), DecodeError> {
    let (header, next) = H::decode(buf, offset)?;
    if trace {
        header.trace();
    }
    Ok((header, next))
}

/// Shape of the hop stack for one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HopLayout {
    pub fields_per_hop: usize,
    pub num_transits: usize,
}

impl HopLayout {
    /// Pick the hop layout either from configuration or from the report's own
    /// shim and metadata headers.
    pub fn resolve(report: &IntReport, cfg: &DecodeConfig) -> Self {
        match cfg.hop_source {
            HopSource::Config => {
                Self { fields_per_hop: cfg.fields_per_hop, num_transits: cfg.num_transits }
            }
            HopSource::Header => Self::from_headers(&report.shim, &report.int_meta),
        }
    }

    /// `num_transits = (shim.len - 3) / hop_metadata_len`.
    ///
    /// Headers that cannot describe a whole record yield an empty stack.
    pub fn from_headers(shim: &ShimHeader, meta: &IntMetaHeader) -> Self {
        let fields_per_hop = usize::from(meta.hop_metadata_len);
        let shim_words = usize::from(shim.len);

        if fields_per_hop < RECORD_WORDS || shim_words < SHIM_AND_META_WORDS {
            warn!(
                hop_metadata_len = meta.hop_metadata_len,
                shim_len = shim.len,
                "INT headers do not describe a usable hop stack; skipping hops"
            );
            return Self { fields_per_hop: RECORD_WORDS, num_transits: 0 };
        }

        let num_transits = (shim_words - SHIM_AND_META_WORDS) / fields_per_hop;
        Self { fields_per_hop, num_transits }
    }

    /// Bytes of the hop stack under this layout.
    pub fn span(&self) -> usize {
        self.fields_per_hop.saturating_mul(4).saturating_mul(self.num_transits)
    }
}
