mod common;

use common::{hop, payload, put_fixed, sample_report, BitWriter, TestResult};
use int_collector_lib::decode::{
    decode_hops, BitCursor, DecodeError, IntReport, WireHeader, FIXED_HEADERS_SIZE,
};
use int_collector_lib::decode::{
    EthernetHeader, IntMetaHeader, Ipv4Header, ReportFixedHeader, ShimHeader, UdpHeader,
};

#[test]
fn recovers_every_header_field() -> TestResult {
    let expected = sample_report();
    let buf = payload(&expected, &[], 10);

    let (decoded, offset) = IntReport::decode(&buf)?;
    assert_eq!(decoded, expected);
    assert_eq!(offset, FIXED_HEADERS_SIZE);
    Ok(())
}

#[test]
fn recovers_extreme_field_values() -> TestResult {
    let mut expected = sample_report();
    expected.report.ver = 0xf;
    expected.report.hw_id = 0x3f;
    expected.ethernet.dst_addr = 0xffff_ffff_ffff;
    expected.ipv4.frag_offset = 0x1fff;
    expected.ipv4.flags = 0b111;
    expected.shim.rsvd2 = 0b11;
    expected.int_meta.hop_metadata_len = 0x1f;
    expected.int_meta.rsvd1 = 0x7f;
    let buf = payload(&expected, &[], 10);

    let (decoded, _) = IntReport::decode(&buf)?;
    assert_eq!(decoded, expected);
    Ok(())
}

#[test]
fn fixed_headers_always_take_560_bits() {
    let mut w = BitWriter::default();
    put_fixed(&mut w, &sample_report());
    assert_eq!(w.bit_len(), 560);

    let mut w = BitWriter::default();
    put_fixed(&mut w, &IntReport::default());
    assert_eq!(w.bit_len(), 560);
}

#[test]
fn each_decoder_consumes_its_span() -> TestResult {
    let buf = payload(&sample_report(), &[], 10);
    let (_, o) = ReportFixedHeader::decode(&buf, 0)?;
    assert_eq!(o, 16);
    let (_, o) = EthernetHeader::decode(&buf, o)?;
    assert_eq!(o, 30);
    let (_, o) = Ipv4Header::decode(&buf, o)?;
    assert_eq!(o, 50);
    let (_, o) = UdpHeader::decode(&buf, o)?;
    assert_eq!(o, 58);
    let (_, o) = ShimHeader::decode(&buf, o)?;
    assert_eq!(o, 62);
    let (_, o) = IntMetaHeader::decode(&buf, o)?;
    assert_eq!(o, 70);
    Ok(())
}

#[test]
fn truncation_anywhere_in_fixed_headers_is_underrun() {
    let buf = payload(&sample_report(), &[], 10);
    for len in 0..FIXED_HEADERS_SIZE {
        let err = IntReport::decode(&buf[..len]).err();
        assert!(
            matches!(err, Some(DecodeError::BufferUnderrun { .. })),
            "length {len} decoded without underrun"
        );
    }
}

#[test]
fn truncation_names_the_header_being_decoded() {
    let buf = payload(&sample_report(), &[], 10);
    let cases = [
        (0, "report"),
        (15, "report"),
        (16, "ethernet"),
        (29, "ethernet"),
        (30, "ipv4"),
        (49, "ipv4"),
        (50, "udp"),
        (57, "udp"),
        (58, "shim"),
        (61, "shim"),
        (62, "int_meta"),
        (69, "int_meta"),
    ];
    for (len, header) in cases {
        match IntReport::decode(&buf[..len]) {
            Err(DecodeError::BufferUnderrun { what, .. }) => {
                assert_eq!(what, header, "length {len}")
            }
            other => panic!("length {len}: expected underrun, got {other:?}"),
        }
    }
}

#[test]
fn hop_stack_recovers_records_in_order() -> TestResult {
    let hops = [hop(1, 100, 5), hop(2, 250, 0x00ff_ffff), hop(3, 75, 0)];
    let buf = payload(&sample_report(), &hops, 10);
    assert_eq!(buf.len(), FIXED_HEADERS_SIZE + 3 * 40);

    let (records, end) = decode_hops(&buf, FIXED_HEADERS_SIZE, 10, 3)?;
    assert_eq!(records, hops.to_vec());
    assert_eq!(end - FIXED_HEADERS_SIZE, 120);
    Ok(())
}

#[test]
fn hop_stack_span_scales_with_transits() -> TestResult {
    for n in 0..6usize {
        let hops: Vec<_> = (0..n).map(|i| hop(i as u32 + 1, 10 * i as u32, 0)).collect();
        let buf = payload(&sample_report(), &hops, 10);
        let (records, end) = decode_hops(&buf, FIXED_HEADERS_SIZE, 10, n)?;
        assert_eq!(records.len(), n);
        assert_eq!(end - FIXED_HEADERS_SIZE, 40 * n);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.switch_id, i as u32 + 1);
        }
    }
    Ok(())
}

#[test]
fn short_hop_stack_yields_no_records() {
    let hops = [hop(1, 100, 0), hop(2, 250, 0)];
    let buf = payload(&sample_report(), &hops, 10);
    let err = decode_hops(&buf[..buf.len() - 1], FIXED_HEADERS_SIZE, 10, 2).err();
    assert!(matches!(err, Some(DecodeError::BufferUnderrun { needed: 80, available: 79, .. })));
}

#[test]
fn cursor_never_passes_end() {
    let buf = [0xa5u8; 3];
    let mut cursor = BitCursor::new(&buf);
    let mut widths = [7u32, 9, 5, 13].into_iter().cycle();
    loop {
        let width = widths.next().unwrap_or(1);
        let before = cursor.position();
        match cursor.read(width) {
            Ok(v) => assert!(v < (1u64 << width)),
            Err(_) => {
                assert_eq!(cursor.position(), before);
                break;
            }
        }
        assert!(cursor.position() <= cursor.len_bits());
    }
}
