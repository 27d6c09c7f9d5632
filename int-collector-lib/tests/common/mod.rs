//! Test-only encoder packing the same bit layouts the decoders read.

#![allow(dead_code)]

use int_collector_lib::decode::{
    EthernetHeader, IntMetaHeader, IntReport, Ipv4Header, PerHopRecord, ReportFixedHeader,
    ShimHeader, UdpHeader,
};

pub type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bits: usize,
}

impl BitWriter {
    pub fn push(&mut self, value: u64, width: u32) -> &mut Self {
        for i in (0..width).rev() {
            let bit = (value >> i) & 1;
            if self.bits % 8 == 0 {
                self.bytes.push(0);
            }
            if bit == 1 {
                let shift = 7 - (self.bits % 8);
                if let Some(last) = self.bytes.last_mut() {
                    *last |= 1 << shift;
                }
            }
            self.bits += 1;
        }
        self
    }

    pub fn flag(&mut self, value: bool) -> &mut Self {
        self.push(u64::from(value), 1)
    }

    pub fn pad_words(&mut self, words: usize) -> &mut Self {
        for _ in 0..words {
            self.push(0xeeee_eeee, 32);
        }
        self
    }

    pub fn bit_len(&self) -> usize {
        self.bits
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

pub fn put_report(w: &mut BitWriter, h: &ReportFixedHeader) {
    w.push(h.ver.into(), 4)
        .push(h.len.into(), 4)
        .push(h.nproto.into(), 3)
        .push(h.rep_md_bits.into(), 6)
        .push(h.rsvd.into(), 6)
        .flag(h.d)
        .flag(h.q)
        .flag(h.f)
        .push(h.hw_id.into(), 6)
        .push(h.sw_id.into(), 32)
        .push(h.seq_no.into(), 32)
        .push(h.ingress_tstamp.into(), 32);
}

pub fn put_ethernet(w: &mut BitWriter, h: &EthernetHeader) {
    w.push(h.dst_addr, 48).push(h.src_addr, 48).push(h.ether_type.into(), 16);
}

pub fn put_ipv4(w: &mut BitWriter, h: &Ipv4Header) {
    w.push(h.version.into(), 4)
        .push(h.ihl.into(), 4)
        .push(h.dscp.into(), 6)
        .push(h.ecn.into(), 2)
        .push(h.length.into(), 16)
        .push(h.identification.into(), 16)
        .push(h.flags.into(), 3)
        .push(h.frag_offset.into(), 13)
        .push(h.ttl.into(), 8)
        .push(h.protocol.into(), 8)
        .push(h.hdr_checksum.into(), 16)
        .push(h.src_addr.into(), 32)
        .push(h.dst_addr.into(), 32);
}

pub fn put_udp(w: &mut BitWriter, h: &UdpHeader) {
    w.push(h.src_port.into(), 16)
        .push(h.dst_port.into(), 16)
        .push(h.length.into(), 16)
        .push(h.checksum.into(), 16);
}

pub fn put_shim(w: &mut BitWriter, h: &ShimHeader) {
    w.push(h.int_type.into(), 8)
        .push(h.rsvd1.into(), 8)
        .push(h.len.into(), 8)
        .push(h.dscp.into(), 6)
        .push(h.rsvd2.into(), 2);
}

pub fn put_int_meta(w: &mut BitWriter, h: &IntMetaHeader) {
    w.push(h.ver.into(), 4)
        .push(h.rep.into(), 2)
        .flag(h.c)
        .flag(h.e)
        .flag(h.m)
        .push(h.rsvd1.into(), 7)
        .push(h.rsvd2.into(), 3)
        .push(h.hop_metadata_len.into(), 5)
        .push(h.remaining_hop_cnt.into(), 8)
        .push(h.instruction_mask_0003.into(), 4)
        .push(h.instruction_mask_0407.into(), 4)
        .push(h.instruction_mask_0811.into(), 4)
        .push(h.instruction_mask_1215.into(), 4)
        .push(h.rsvd3.into(), 16);
}

/// One hop record followed by `fields_per_hop - 8` filler words.
pub fn put_hop(w: &mut BitWriter, h: &PerHopRecord, fields_per_hop: usize) {
    w.push(h.switch_id.into(), 32)
        .push(h.ingress_port.into(), 16)
        .push(h.egress_port.into(), 16)
        .push(h.hop_latency.into(), 32)
        .push(h.q_id.into(), 8)
        .push(h.q_occupancy.into(), 24)
        .push(h.ingress_tstamp.into(), 32)
        .push(h.egress_tstamp.into(), 32)
        .push(h.l2_ingress_port.into(), 16)
        .push(h.l2_egress_port.into(), 16)
        .push(h.egress_port_tx_util.into(), 32);
    w.pad_words(fields_per_hop.saturating_sub(8));
}

pub fn put_fixed(w: &mut BitWriter, r: &IntReport) {
    put_report(w, &r.report);
    put_ethernet(w, &r.ethernet);
    put_ipv4(w, &r.ipv4);
    put_udp(w, &r.udp);
    put_shim(w, &r.shim);
    put_int_meta(w, &r.int_meta);
}

pub fn payload(report: &IntReport, hops: &[PerHopRecord], fields_per_hop: usize) -> Vec<u8> {
    let mut w = BitWriter::default();
    put_fixed(&mut w, report);
    for hop in hops {
        put_hop(&mut w, hop, fields_per_hop);
    }
    w.finish()
}

/// Headers with every field set to a distinct non-trivial value.
pub fn sample_report() -> IntReport {
    IntReport {
        report: ReportFixedHeader {
            ver: 1,
            len: 4,
            nproto: 0b101,
            rep_md_bits: 0b10_1010,
            rsvd: 0b01_0101,
            d: true,
            q: false,
            f: true,
            hw_id: 0b11_0011,
            sw_id: 0x0102_0304,
            seq_no: 0xdead_beef,
            ingress_tstamp: 0x7fff_0001,
        },
        ethernet: EthernetHeader {
            dst_addr: 0x0000_0a0b_0c0d_0e0f,
            src_addr: 0x0000_1122_3344_5566,
            ether_type: 0x0800,
        },
        ipv4: Ipv4Header {
            version: 4,
            ihl: 5,
            dscp: 0b10_0111,
            ecn: 0b10,
            length: 1500,
            identification: 0xabcd,
            flags: 0b010,
            frag_offset: 0x1abc,
            ttl: 63,
            protocol: 17,
            hdr_checksum: 0x9f3c,
            src_addr: 0x0a00_0001,
            dst_addr: 0x0a00_0202,
        },
        udp: UdpHeader { src_port: 49152, dst_port: 5000, length: 220, checksum: 0x5a5a },
        shim: ShimHeader { int_type: 1, rsvd1: 0x7e, len: 33, dscp: 0b11_1101, rsvd2: 0b01 },
        int_meta: IntMetaHeader {
            ver: 2,
            rep: 0b11,
            c: true,
            e: false,
            m: true,
            rsvd1: 0b101_0101,
            rsvd2: 0b110,
            hop_metadata_len: 10,
            remaining_hop_cnt: 5,
            instruction_mask_0003: 0b1111,
            instruction_mask_0407: 0b1100,
            instruction_mask_0811: 0b0001,
            instruction_mask_1215: 0b1010,
            rsvd3: 0xbeef,
        },
    }
}

pub fn hop(switch_id: u32, hop_latency: u32, q_occupancy: u32) -> PerHopRecord {
    PerHopRecord {
        switch_id,
        ingress_port: 1,
        egress_port: 2,
        hop_latency,
        q_id: 7,
        q_occupancy,
        ingress_tstamp: 1_000,
        egress_tstamp: 1_000 + hop_latency,
        l2_ingress_port: 11,
        l2_egress_port: 12,
        egress_port_tx_util: 40,
    }
}
