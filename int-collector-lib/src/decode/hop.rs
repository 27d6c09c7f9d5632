//! Per-hop metadata records that follow the INT metadata header.

use super::bits::BitCursor;
use super::error::DecodeError;
use crate::config::MetricKind;

/// Words occupied by the fields of one [`PerHopRecord`].
pub const RECORD_WORDS: usize = 8;
/// Bytes occupied by the fields of one [`PerHopRecord`].
pub const RECORD_SIZE: usize = RECORD_WORDS * 4;

/// Metadata pushed by one transit switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PerHopRecord {
    pub switch_id: u32,
    pub ingress_port: u16,
    pub egress_port: u16,
    pub hop_latency: u32,
    pub q_id: u8,
    /// 24-bit queue depth.
    pub q_occupancy: u32,
    pub ingress_tstamp: u32,
    pub egress_tstamp: u32,
    pub l2_ingress_port: u16,
    pub l2_egress_port: u16,
    pub egress_port_tx_util: u32,
}

impl PerHopRecord {
    fn read_fields(c: &mut BitCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            switch_id: c.read_u32(32)?,
            ingress_port: c.read_u16(16)?,
            egress_port: c.read_u16(16)?,
            hop_latency: c.read_u32(32)?,
            q_id: c.read_u8(8)?,
            q_occupancy: c.read_u32(24)?,
            ingress_tstamp: c.read_u32(32)?,
            egress_tstamp: c.read_u32(32)?,
            l2_ingress_port: c.read_u16(16)?,
            l2_egress_port: c.read_u16(16)?,
            egress_port_tx_util: c.read_u32(32)?,
        })
    }

    /// Value sampled for the given metric kind.
    pub fn metric(&self, kind: MetricKind) -> u64 {
        match kind {
            MetricKind::HopLatency => u64::from(self.hop_latency),
            MetricKind::QueueOccupancy => u64::from(self.q_occupancy),
        }
    }
}

/// Iterator over whole hop records, one stride of `4 * fields_per_hop` bytes each.
///
/// Yields `Err(BufferUnderrun)` once if a stride does not fit, then stops.
/// A record is only produced when its entire stride is present.
#[derive(Debug, Clone)]
pub struct HopRecords<'a> {
    buf: &'a [u8],
    offset: usize,
    stride: usize,
    left: usize,
}

impl<'a> HopRecords<'a> {
    pub fn new(buf: &'a [u8], offset: usize, fields_per_hop: usize, num_transits: usize) -> Self {
        Self { buf, offset, stride: fields_per_hop.saturating_mul(4), left: num_transits }
    }

    /// Offset of the next unread stride.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn next_record(&mut self) -> Result<PerHopRecord, DecodeError> {
        let stride = self
            .offset
            .checked_add(self.stride)
            .and_then(|end| self.buf.get(self.offset..end))
            .ok_or(DecodeError::BufferUnderrun {
                what: "hop record",
                offset: self.offset,
                needed: self.stride,
                available: self.buf.len().saturating_sub(self.offset),
            })?;
        let record_bytes = stride.get(..RECORD_SIZE).ok_or(DecodeError::BufferUnderrun {
            what: "hop record",
            offset: self.offset,
            needed: RECORD_SIZE,
            available: stride.len(),
        })?;

        let record = PerHopRecord::read_fields(&mut BitCursor::new(record_bytes))?;
        self.offset += self.stride;
        Ok(record)
    }
}

impl Iterator for HopRecords<'_> {
    type Item = Result<PerHopRecord, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.left == 0 {
            return None;
        }
        match self.next_record() {
            Ok(record) => {
                self.left -= 1;
                Some(Ok(record))
            }
            Err(e) => {
                self.left = 0;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.left))
    }
}

/// Decode `num_transits` hop records starting at `offset`.
///
/// All or nothing: the whole `4 * fields_per_hop * num_transits` span is
/// checked before any record is read. Returns the records in wire order
/// and the offset just past the span.
pub fn decode_hops(
    buf: &[u8],
    offset: usize,
    fields_per_hop: usize,
    num_transits: usize,
) -> Result<(Vec<PerHopRecord>, usize), DecodeError> {
    let span = fields_per_hop.saturating_mul(4).saturating_mul(num_transits);
    let available = buf.len().saturating_sub(offset);
    if span > available {
        return Err(DecodeError::BufferUnderrun { what: "hop stack", offset, needed: span, available });
    }

    let mut hops = HopRecords::new(buf, offset, fields_per_hop, num_transits);
    let records = hops.by_ref().collect::<Result<Vec<_>, _>>()?;
    Ok((records, hops.offset()))
}
