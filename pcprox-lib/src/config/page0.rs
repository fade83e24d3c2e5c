//! Page 0: ID bit counts, display parameters and the main flag byte.

use crate::bitfield::{FLAGS8, NIBBLE_PAIR, bit, flags_to_bits, pack_bits, unpack_bits};
use crate::config::PageBytes;
use crate::error::PcProxError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Page0 {
    /// iFACDispLen: facility code display width when `fix_len_dsp` is set
    pub fac_disp_len: u8,
    /// iIDDispLen: ID display width when `fix_len_dsp` is set
    pub id_disp_len: u8,
    /// iLeadParityBitCnt (4 bits)
    pub lead_parity_bit_count: u8,
    /// iTrailParityBitCnt (4 bits)
    pub trail_parity_bit_count: u8,
    /// iIDBitCnt
    pub id_bit_count: u8,
    /// iTotalBitCnt
    pub total_bit_count: u8,
    /// iFACIDDelim
    pub fac_id_delim: u8,
    /// iELDelim
    pub el_delim: u8,

    pub fix_len_dsp: bool,
    pub frc_bit_cnt_ex: bool,
    pub strip_fac: bool,
    pub snd_fac: bool,
    pub use_del_fac2_id: bool,
    pub no_use_el_char: bool,
    pub snd_on_rx: bool,
    pub halt_kb_snd: bool,
}

impl Page0 {
    pub fn encode(&self) -> Result<PageBytes, PcProxError> {
        let parity = pack_bits(
            NIBBLE_PAIR,
            &[self.lead_parity_bit_count, self.trail_parity_bit_count],
        )?;
        let flags = pack_bits(
            FLAGS8,
            &flags_to_bits(&[
                self.fix_len_dsp,
                self.frc_bit_cnt_ex,
                self.strip_fac,
                self.snd_fac,
                self.use_del_fac2_id,
                self.no_use_el_char,
                self.snd_on_rx,
                self.halt_kb_snd,
            ]),
        )?;
        Ok([
            self.fac_disp_len,
            self.id_disp_len,
            parity,
            self.id_bit_count,
            self.total_bit_count,
            self.fac_id_delim,
            self.el_delim,
            flags,
        ])
    }

    pub fn decode(bytes: PageBytes) -> Result<Self, PcProxError> {
        let parity = unpack_bits(bytes[2], NIBBLE_PAIR);
        let flags = unpack_bits(bytes[7], FLAGS8);
        Ok(Self {
            fac_disp_len: bytes[0],
            id_disp_len: bytes[1],
            lead_parity_bit_count: parity[0],
            trail_parity_bit_count: parity[1],
            id_bit_count: bytes[3],
            total_bit_count: bytes[4],
            fac_id_delim: bytes[5],
            el_delim: bytes[6],
            fix_len_dsp: bit(&flags, 0),
            frc_bit_cnt_ex: bit(&flags, 1),
            strip_fac: bit(&flags, 2),
            snd_fac: bit(&flags, 3),
            use_del_fac2_id: bit(&flags, 4),
            no_use_el_char: bit(&flags, 5),
            snd_on_rx: bit(&flags, 6),
            halt_kb_snd: bit(&flags, 7),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_literal() {
        let page = Page0::decode([0x00, 0x0a, 0x11, 0x18, 0x1a, b'-', 0x0d, 0x89]).unwrap();
        assert_eq!(page.id_disp_len, 10);
        assert_eq!(page.lead_parity_bit_count, 1);
        assert_eq!(page.trail_parity_bit_count, 1);
        assert_eq!(page.id_bit_count, 24);
        assert_eq!(page.total_bit_count, 26);
        assert_eq!(page.fac_id_delim, b'-');
        assert!(page.fix_len_dsp);
        assert!(page.snd_fac);
        assert!(page.halt_kb_snd);
        assert!(!page.strip_fac);
    }

    #[test]
    fn test_parity_nibble_out_of_range() {
        let page = Page0 {
            trail_parity_bit_count: 16,
            ..Default::default()
        };
        assert!(matches!(page.encode(), Err(PcProxError::Range { width: 4, .. })));
    }
}
