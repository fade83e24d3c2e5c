//! Card buffer decoding against known Wiegand layouts

mod common;

use common::*;

fn buffer0(stream: u64) -> pcprox_lib::frame::Response {
    decode_response(stream.to_le_bytes())
}

fn buffer1(length: u8) -> pcprox_lib::frame::Response {
    decode_response([length, length, 0, 0, 0, 0, 0, 0])
}

#[test]
fn test_h10301_from_reader_literal() {
    let scan = CardScan::decode(
        &decode_response(frame("4b13e00c00000000")),
        &decode_response(frame("1a1a000000000000")),
        ParityBits { lead: 1, trail: 1 },
    )
    .unwrap();
    assert_eq!(scan.layout, CardLayout::H10301);
    assert_eq!(scan.facility_code, Some(56));
    assert_eq!(scan.card_number, Some(1234));
    assert_eq!(scan.total_bit_count, 28);
}

#[test]
fn test_parity_from_page0() {
    let page0 = Page0::decode(frame(H10301_PAGE0)).unwrap();
    let parity = ParityBits::from(&page0);
    assert_eq!(parity, ParityBits { lead: 1, trail: 1 });
}

#[test]
fn test_h10301_parity_bits_not_checked() {
    let fields = (200u64 << 17) | (65000 << 1);
    for framing in [0u64, 1, 1 << 27, (1 << 27) | 1, 0b10 | (1 << 26)] {
        let scan = CardScan::decode(
            &buffer0((fields << 1) | framing),
            &buffer1(26),
            ParityBits { lead: 1, trail: 1 },
        )
        .unwrap();
        assert_eq!(scan.facility_code, Some(200), "framing {framing:#x}");
        assert_eq!(scan.card_number, Some(65000), "framing {framing:#x}");
    }
}

#[test]
fn test_corporate_1000_48() {
    let company = 1_000_000u64;
    let card = 4_242_424u64;
    let bits = (company << 24) | (card << 1);
    let scan = CardScan::decode(&buffer0(bits << 1), &buffer1(48), ParityBits { lead: 2, trail: 1 }).unwrap();
    assert_eq!(scan.layout, CardLayout::Corporate1000Bit48);
    assert_eq!(scan.facility_code, Some(1_000_000));
    assert_eq!(scan.card_number, Some(4_242_424));
    assert_eq!(scan.total_bit_count, 51);
    assert_eq!(scan.raw_bits.len(), 48);
}

#[test]
fn test_corporate_1000_48_uses_top_company_bits() {
    // Company code needs all 24 bits, up to the MS end of the stripped stream
    let company = 0xC0_0001u64;
    let bits = (company << 24) | (7 << 1);
    let scan = CardScan::decode(&buffer0(bits << 1), &buffer1(48), ParityBits { lead: 2, trail: 1 }).unwrap();
    assert_eq!(scan.layout, CardLayout::Corporate1000Bit48);
    assert_eq!(scan.facility_code, Some(0xC0_0001));
    assert_eq!(scan.card_number, Some(7));
    assert!(scan.raw_bits[0] && scan.raw_bits[1]);
}

#[test]
fn test_layout_requires_matching_parity() {
    // Right length, wrong framing: not an H10301
    let scan = CardScan::decode(
        &decode_response(frame("4b13e00c00000000")),
        &buffer1(26),
        ParityBits { lead: 0, trail: 0 },
    )
    .unwrap();
    assert_eq!(scan.layout, CardLayout::Unknown);
    assert_eq!(scan.facility_code, None);
}

#[test]
fn test_unknown_layout_keeps_raw_bits() {
    let scan = CardScan::decode(&buffer0(0x12_3456_789a), &buffer1(40), ParityBits::default()).unwrap();
    assert_eq!(scan.layout, CardLayout::Unknown);
    assert_eq!(scan.card_number, None);
    assert_eq!(scan.facility_code, None);
    assert_eq!(scan.raw_bits.len(), 40);
    assert_eq!(scan.raw_value(), 0x12_3456_789a);
    // Most significant bit first
    assert!(!scan.raw_bits[0]);
    assert!(!*scan.raw_bits.last().unwrap());
    assert_eq!(scan.to_string(), "Unknown (40 bits): 0x123456789a");
}

#[test]
fn test_bits_beyond_stream_ignored() {
    let scan = CardScan::decode(&buffer0(0xffff_0000_0000_00f0), &buffer1(8), ParityBits::default()).unwrap();
    assert_eq!(scan.raw_value(), 0xf0);
}

#[test]
fn test_parity_stripped_from_both_ends() {
    // 4 data bits 0b1001 framed by lead 0b11 and trail 0b1
    let scan = CardScan::decode(&buffer0(0b11_1001_1), &buffer1(4), ParityBits { lead: 2, trail: 1 }).unwrap();
    assert_eq!(scan.raw_bits, vec![true, false, false, true]);
    assert_eq!(scan.total_bit_count, 7);
}

#[test]
fn test_total_over_64_bits_rejected() {
    let err = CardScan::decode(&buffer0(0), &buffer1(63), ParityBits { lead: 1, trail: 1 }).unwrap_err();
    assert!(matches!(err, PcProxError::Protocol(_)));
}
