//! Card buffer decoding.
//!
//! A scan is fetched as two frames. Buffer 1 carries the bit length of the
//! card data (twice, in bytes 0 and 1). Buffer 0 carries the data itself as
//! a little-endian bit stream, LSB of byte 0 being the last bit received.
//!
//! The stream is `buffer_length + lead + trail` bits long, where `lead` and
//! `trail` are the parity bit counts from page 0. Those bits are dropped
//! from the MS and LS ends respectively and never checked. The remaining
//! `buffer_length` bits are matched against the known Wiegand layouts.

use crate::config::Page0;
use crate::error::PcProxError;
use crate::frame::Response;
use std::fmt;
use strum_macros::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const STREAM_BITS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CardLayout {
    #[strum(to_string = "H10301 26-bit")]
    H10301,
    #[strum(to_string = "Corporate 1000 35-bit")]
    Corporate1000Bit35,
    #[strum(to_string = "Corporate 1000 48-bit")]
    Corporate1000Bit48,
    #[strum(to_string = "Unknown")]
    Unknown,
}

/// A field inside the stripped bit stream, offset counted from the LS end.
#[derive(Debug, Clone, Copy)]
struct BitSpan {
    offset: u32,
    width: u32,
}

impl BitSpan {
    const fn new(offset: u32, width: u32) -> Self {
        Self { offset, width }
    }

    fn extract(&self, bits: u64) -> u32 {
        ((bits >> self.offset) & mask(self.width)) as u32
    }
}

struct LayoutSpec {
    layout: CardLayout,
    bits: u32,
    lead: u8,
    trail: u8,
    facility: BitSpan,
    card: BitSpan,
}

// The remaining bits keep the layout's framing positions; bit 0 and the top
// one or two bits are skipped.
const LAYOUTS: &[LayoutSpec] = &[
    LayoutSpec {
        layout: CardLayout::H10301,
        bits: 26,
        lead: 1,
        trail: 1,
        facility: BitSpan::new(17, 8),
        card: BitSpan::new(1, 16),
    },
    LayoutSpec {
        layout: CardLayout::Corporate1000Bit35,
        bits: 35,
        lead: 2,
        trail: 1,
        facility: BitSpan::new(21, 12),
        card: BitSpan::new(1, 20),
    },
    LayoutSpec {
        layout: CardLayout::Corporate1000Bit48,
        bits: 48,
        lead: 2,
        trail: 1,
        facility: BitSpan::new(24, 24),
        card: BitSpan::new(1, 23),
    },
];

fn mask(width: u32) -> u64 {
    if width >= STREAM_BITS {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Parity bit counts taken from the active page 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParityBits {
    pub lead: u8,
    pub trail: u8,
}

impl From<&Page0> for ParityBits {
    fn from(page: &Page0) -> Self {
        Self {
            lead: page.lead_parity_bit_count,
            trail: page.trail_parity_bit_count,
        }
    }
}

/// Bit length announced by buffer 1.
pub fn buffer_length(buffer1: &Response) -> Result<u8, PcProxError> {
    let bytes = buffer1.as_bytes();
    if bytes[0] != bytes[1] {
        return Err(PcProxError::Protocol(format!(
            "card buffer length copies disagree: {} != {}",
            bytes[0], bytes[1]
        )));
    }
    Ok(bytes[0])
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CardScan {
    /// Card bits after parity stripping, most significant first.
    pub raw_bits: Vec<bool>,
    /// Length of the stream in buffer 0, parity bits included.
    pub total_bit_count: u32,
    pub layout: CardLayout,
    pub card_number: Option<u32>,
    pub facility_code: Option<u32>,
}

impl CardScan {
    pub fn decode(buffer0: &Response, buffer1: &Response, parity: ParityBits) -> Result<Self, PcProxError> {
        let length = buffer_length(buffer1)? as u32;
        let total_bit_count = length + parity.lead as u32 + parity.trail as u32;
        if total_bit_count > STREAM_BITS {
            return Err(PcProxError::Protocol(format!(
                "{total_bit_count} card bits do not fit the {STREAM_BITS}-bit buffer"
            )));
        }

        let stream = u64::from_le_bytes(*buffer0.as_bytes()) & mask(total_bit_count);
        let bits = stream.checked_shr(parity.trail as u32).unwrap_or(0) & mask(length);
        let raw_bits = (0..length).rev().map(|i| (bits >> i) & 1 == 1).collect();

        let matched = LAYOUTS
            .iter()
            .find(|l| l.bits == length && l.lead == parity.lead && l.trail == parity.trail);

        Ok(match matched {
            Some(known) => Self {
                raw_bits,
                total_bit_count,
                layout: known.layout,
                card_number: Some(known.card.extract(bits)),
                facility_code: Some(known.facility.extract(bits)),
            },
            None => Self {
                raw_bits,
                total_bit_count,
                layout: CardLayout::Unknown,
                card_number: None,
                facility_code: None,
            },
        })
    }

    /// The stripped bits as an integer.
    pub fn raw_value(&self) -> u64 {
        self.raw_bits.iter().fold(0u64, |acc, &b| (acc << 1) | b as u64)
    }
}

impl fmt::Display for CardScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.facility_code, self.card_number) {
            (Some(fc), Some(cn)) => write!(f, "{} FC={} CN={}", self.layout, fc, cn),
            _ => write!(
                f,
                "{} ({} bits): {:#x}",
                self.layout,
                self.raw_bits.len(),
                self.raw_value()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::decode_response;

    fn buffer1(length: u8) -> Response {
        decode_response([length, length, 0, 0, 0, 0, 0, 0])
    }

    #[test]
    fn test_h10301_literal() {
        // FC 56, CN 1234 with every parity/framing bit set
        let buffer0 = decode_response([0x4b, 0x13, 0xe0, 0x0c, 0, 0, 0, 0]);
        let scan = CardScan::decode(&buffer0, &buffer1(26), ParityBits { lead: 1, trail: 1 }).unwrap();
        assert_eq!(scan.layout, CardLayout::H10301);
        assert_eq!(scan.facility_code, Some(56));
        assert_eq!(scan.card_number, Some(1234));
        assert_eq!(scan.total_bit_count, 28);
        assert_eq!(scan.raw_bits.len(), 26);
        assert_eq!(scan.to_string(), "H10301 26-bit FC=56 CN=1234");
    }

    #[test]
    fn test_corporate_1000_35_literal() {
        // FC 100, CN 12345
        let buffer0 = decode_response([0xe4, 0xc0, 0x00, 0x19, 0, 0, 0, 0]);
        let scan = CardScan::decode(&buffer0, &buffer1(35), ParityBits { lead: 2, trail: 1 }).unwrap();
        assert_eq!(scan.layout, CardLayout::Corporate1000Bit35);
        assert_eq!(scan.facility_code, Some(100));
        assert_eq!(scan.card_number, Some(12345));
    }

    #[test]
    fn test_length_copies_disagree() {
        let err = CardScan::decode(
            &decode_response([0; 8]),
            &decode_response([26, 25, 0, 0, 0, 0, 0, 0]),
            ParityBits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PcProxError::Protocol(_)));
    }

    #[test]
    fn test_stream_longer_than_buffer() {
        let err = CardScan::decode(&decode_response([0xff; 8]), &buffer1(62), ParityBits { lead: 2, trail: 1 })
            .unwrap_err();
        assert!(matches!(err, PcProxError::Protocol(_)));
    }

    #[test]
    fn test_full_64_bit_stream() {
        let scan = CardScan::decode(&decode_response([0xff; 8]), &buffer1(64), ParityBits::default()).unwrap();
        assert_eq!(scan.layout, CardLayout::Unknown);
        assert_eq!(scan.raw_value(), u64::MAX);
    }
}
