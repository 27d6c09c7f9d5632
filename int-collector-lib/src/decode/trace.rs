//! Structured per-field trace events for decoded headers and hop records.
//!
//! Events are emitted at `DEBUG` on [`TRACE_TARGET`] so they can be enabled
//! independently, e.g. `RUST_LOG=int_collector::trace=debug`.

use tracing::debug;

use super::headers::{
    EthernetHeader, IntMetaHeader, Ipv4Header, ReportFixedHeader, ShimHeader, UdpHeader,
};
use super::hop::PerHopRecord;

pub const TRACE_TARGET: &str = "int_collector::trace";

pub trait Traced {
    fn trace(&self);
}

impl Traced for ReportFixedHeader {
    fn trace(&self) {
        debug!(
            target: TRACE_TARGET,
            header = "report",
            ver = self.ver,
            len = self.len,
            nproto = self.nproto,
            rep_md_bits = self.rep_md_bits,
            rsvd = self.rsvd,
            d = self.d,
            q = self.q,
            f = self.f,
            hw_id = self.hw_id,
            sw_id = self.sw_id,
            seq_no = self.seq_no,
            ingress_tstamp = self.ingress_tstamp,
        );
    }
}

impl Traced for EthernetHeader {
    fn trace(&self) {
        debug!(
            target: TRACE_TARGET,
            header = "ethernet",
            dst_addr = %format!("{:012x}", self.dst_addr),
            src_addr = %format!("{:012x}", self.src_addr),
            ether_type = %format!("{:#06x}", self.ether_type),
        );
    }
}

impl Traced for Ipv4Header {
    fn trace(&self) {
        debug!(
            target: TRACE_TARGET,
            header = "ipv4",
            version = self.version,
            ihl = self.ihl,
            dscp = self.dscp,
            ecn = self.ecn,
            length = self.length,
            identification = self.identification,
            flags = self.flags,
            frag_offset = self.frag_offset,
            ttl = self.ttl,
            protocol = self.protocol,
            hdr_checksum = self.hdr_checksum,
            src_addr = %self.src_ip(),
            dst_addr = %self.dst_ip(),
        );
    }
}

impl Traced for UdpHeader {
    fn trace(&self) {
        debug!(
            target: TRACE_TARGET,
            header = "udp",
            src_port = self.src_port,
            dst_port = self.dst_port,
            length = self.length,
            checksum = self.checksum,
        );
    }
}

impl Traced for ShimHeader {
    fn trace(&self) {
        debug!(
            target: TRACE_TARGET,
            header = "shim",
            int_type = self.int_type,
            rsvd1 = self.rsvd1,
            len = self.len,
            dscp = self.dscp,
            rsvd2 = self.rsvd2,
        );
    }
}

impl Traced for IntMetaHeader {
    fn trace(&self) {
        debug!(
            target: TRACE_TARGET,
            header = "int_meta",
            ver = self.ver,
            rep = self.rep,
            c = self.c,
            e = self.e,
            m = self.m,
            rsvd1 = self.rsvd1,
            rsvd2 = self.rsvd2,
            hop_metadata_len = self.hop_metadata_len,
            remaining_hop_cnt = self.remaining_hop_cnt,
            instruction_mask_0003 = self.instruction_mask_0003,
            instruction_mask_0407 = self.instruction_mask_0407,
            instruction_mask_0811 = self.instruction_mask_0811,
            instruction_mask_1215 = self.instruction_mask_1215,
            rsvd3 = self.rsvd3,
        );
    }
}

impl Traced for PerHopRecord {
    fn trace(&self) {
        debug!(
            target: TRACE_TARGET,
            header = "hop",
            switch_id = self.switch_id,
            ingress_port = self.ingress_port,
            egress_port = self.egress_port,
            hop_latency = self.hop_latency,
            q_id = self.q_id,
            q_occupancy = self.q_occupancy,
            ingress_tstamp = self.ingress_tstamp,
            egress_tstamp = self.egress_tstamp,
            l2_ingress_port = self.l2_ingress_port,
            l2_egress_port = self.l2_egress_port,
            egress_port_tx_util = self.egress_port_tx_util,
        );
    }
}
