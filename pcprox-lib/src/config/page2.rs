//! Page 2: LED/beeper/relay state, display flags and extra characters.
//!
//! Leading and trailing characters live in one three-slot array. Leading
//! characters take slots `[0, lead)`, trailing characters follow at
//! `[lead, lead + trail)`. The two counts together may not exceed three.

use crate::bitfield::{FLAGS8, Layout, NIBBLE_PAIR, Run, bit, flags_to_bits, pack_bits, unpack_bits};
use crate::config::PageBytes;
use crate::constants::SHARED_CHAR_SLOTS;
use crate::error::PcProxError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const OUTPUTS: &Layout = &[
    Run::Field(1), // iRedLEDState
    Run::Field(1), // iGrnLEDState
    Run::Field(1), // iBeeperState
    Run::Field(1), // iRelayState
    Run::Unknown(4),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Page2 {
    pub red_led: bool,
    pub green_led: bool,
    pub beeper: bool,
    pub relay: bool,

    pub use_lead_chrs: bool,
    pub app_ctrls_led: bool,
    pub dsp_hex: bool,
    pub wieg_inv_data: bool,
    pub beep_id: bool,
    pub rev_wieg_bits: bool,
    pub rev_bytes: bool,
    pub use_inv_data_f: bool,

    /// iCrdGnChr0
    pub card_gen_char0: u8,
    /// iCrdGnChr1
    pub card_gen_char1: u8,

    lead_char_count: u8,
    trail_char_count: u8,
    chars: [u8; SHARED_CHAR_SLOTS],
}

fn check_counts(lead: usize, trail: usize) -> Result<(), PcProxError> {
    if lead + trail > SHARED_CHAR_SLOTS {
        return Err(PcProxError::Constraint(format!(
            "{lead} leading + {trail} trailing characters exceed {SHARED_CHAR_SLOTS} shared slots"
        )));
    }
    Ok(())
}

impl Page2 {
    pub fn lead_char_count(&self) -> u8 {
        self.lead_char_count
    }

    pub fn trail_char_count(&self) -> u8 {
        self.trail_char_count
    }

    pub fn lead_chars(&self) -> &[u8] {
        &self.chars[..self.lead_char_count as usize]
    }

    pub fn trail_chars(&self) -> &[u8] {
        let start = self.lead_char_count as usize;
        &self.chars[start..start + self.trail_char_count as usize]
    }

    /// Replace both character runs at once.
    pub fn set_chars(&mut self, lead: &[u8], trail: &[u8]) -> Result<(), PcProxError> {
        check_counts(lead.len(), trail.len())?;
        let mut chars = [0u8; SHARED_CHAR_SLOTS];
        chars[..lead.len()].copy_from_slice(lead);
        chars[lead.len()..lead.len() + trail.len()].copy_from_slice(trail);
        self.chars = chars;
        self.lead_char_count = lead.len() as u8;
        self.trail_char_count = trail.len() as u8;
        Ok(())
    }

    /// Replace the leading characters, keeping the trailing ones.
    pub fn set_lead_chars(&mut self, lead: &[u8]) -> Result<(), PcProxError> {
        let trail = self.trail_chars().to_vec();
        self.set_chars(lead, &trail)
    }

    /// Replace the trailing characters, keeping the leading ones.
    pub fn set_trail_chars(&mut self, trail: &[u8]) -> Result<(), PcProxError> {
        let lead = self.lead_chars().to_vec();
        self.set_chars(&lead, trail)
    }

    pub fn encode(&self) -> Result<PageBytes, PcProxError> {
        let lead = self.lead_char_count as usize;
        let trail = self.trail_char_count as usize;
        check_counts(lead, trail)?;

        let outputs = pack_bits(
            OUTPUTS,
            &flags_to_bits(&[self.red_led, self.green_led, self.beeper, self.relay]),
        )?;
        let flags = pack_bits(
            FLAGS8,
            &flags_to_bits(&[
                self.use_lead_chrs,
                self.app_ctrls_led,
                self.dsp_hex,
                self.wieg_inv_data,
                self.beep_id,
                self.rev_wieg_bits,
                self.rev_bytes,
                self.use_inv_data_f,
            ]),
        )?;
        let counts = pack_bits(NIBBLE_PAIR, &[self.lead_char_count, self.trail_char_count])?;

        let mut slots = [0u8; SHARED_CHAR_SLOTS];
        slots[..lead + trail].copy_from_slice(&self.chars[..lead + trail]);

        Ok([
            outputs,
            flags,
            self.card_gen_char0,
            self.card_gen_char1,
            counts,
            slots[0],
            slots[1],
            slots[2],
        ])
    }

    pub fn decode(bytes: PageBytes) -> Result<Self, PcProxError> {
        let outputs = unpack_bits(bytes[0], OUTPUTS);
        let flags = unpack_bits(bytes[1], FLAGS8);
        let counts = unpack_bits(bytes[4], NIBBLE_PAIR);

        let mut page = Self {
            red_led: bit(&outputs, 0),
            green_led: bit(&outputs, 1),
            beeper: bit(&outputs, 2),
            relay: bit(&outputs, 3),
            use_lead_chrs: bit(&flags, 0),
            app_ctrls_led: bit(&flags, 1),
            dsp_hex: bit(&flags, 2),
            wieg_inv_data: bit(&flags, 3),
            beep_id: bit(&flags, 4),
            rev_wieg_bits: bit(&flags, 5),
            rev_bytes: bit(&flags, 6),
            use_inv_data_f: bit(&flags, 7),
            card_gen_char0: bytes[2],
            card_gen_char1: bytes[3],
            ..Default::default()
        };

        let (lead, trail) = (counts[0] as usize, counts[1] as usize);
        check_counts(lead, trail)?;
        let slots = &bytes[5..5 + SHARED_CHAR_SLOTS];
        page.set_chars(&slots[..lead], &slots[lead..lead + trail])?;
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_chars_follow_lead_chars() {
        let mut page = Page2::default();
        page.set_chars(&[0x1e], &[0x28, 0x2b]).unwrap();
        let bytes = page.encode().unwrap();
        assert_eq!(bytes[4], 0x21);
        assert_eq!(&bytes[5..], &[0x1e, 0x28, 0x2b]);
        assert_eq!(page.lead_chars(), &[0x1e]);
        assert_eq!(page.trail_chars(), &[0x28, 0x2b]);
    }

    #[test]
    fn test_too_many_chars() {
        let mut page = Page2::default();
        page.set_lead_chars(&[1, 2]).unwrap();
        let err = page.set_trail_chars(&[3, 4]).unwrap_err();
        assert!(matches!(err, PcProxError::Constraint(_)));
        // Rejected update leaves the page untouched
        assert_eq!(page.lead_chars(), &[1, 2]);
        assert!(page.trail_chars().is_empty());
    }

    #[test]
    fn test_decode_rejects_overbooked_slots() {
        let err = Page2::decode([0, 0, 0, 0, 0x22, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, PcProxError::Constraint(_)));
    }

    #[test]
    fn test_unused_slots_zeroed() {
        // Slot 2 carries a stale byte the counts do not cover.
        let page = Page2::decode([0x05, 0x02, 0, 0, 0x01, b'A', 0, b'Z']).unwrap();
        assert!(page.red_led && page.beeper && !page.green_led);
        assert!(page.app_ctrls_led);
        assert_eq!(page.encode().unwrap(), [0x05, 0x02, 0, 0, 0x01, b'A', 0, 0]);
    }
}
