//! Page 1: timing parameters and the secondary flag byte.
//!
//! Timings are stored as the raw register values. The `Duration` accessors
//! apply the units the vendor tooling documents (4 ms or 50 ms per step).

use std::time::Duration;

use crate::bitfield::{Layout, Run, bit, flags_to_bits, pack_bits, unpack_bits};
use crate::config::PageBytes;
use crate::constants::{TIMING_UNIT_4MS, TIMING_UNIT_50MS};
use crate::error::PcProxError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const FLAGS: &Layout = &[
    Run::Unknown(1),
    Run::Field(1), // bUse64Bit
    Run::Unknown(1),
    Run::Field(1), // bPrxProEm
    Run::Field(1), // bSndSFID
    Run::Field(1), // bSndSFFC
    Run::Field(1), // bSndSFON
    Run::Field(1), // bUseNumKP
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Page1 {
    /// iBitStrmTO, 4 ms units
    pub bit_stream_timeout: u8,
    /// iIDHoldTO, 50 ms units
    pub id_hold_timeout: u8,
    /// iIDLockOutTm, 50 ms units
    pub id_lockout_time: u8,
    /// iUSBKeyPrsTm, 4 ms units
    pub usb_key_press_time: u8,
    /// iUSBKeyRlsTm, 4 ms units
    pub usb_key_release_time: u8,

    pub use_64_bit: bool,
    pub prx_pro_em: bool,
    pub snd_sf_id: bool,
    pub snd_sf_fc: bool,
    pub snd_sf_on: bool,
    pub use_num_kp: bool,
}

impl Page1 {
    pub fn encode(&self) -> Result<PageBytes, PcProxError> {
        let flags = pack_bits(
            FLAGS,
            &flags_to_bits(&[
                self.use_64_bit,
                self.prx_pro_em,
                self.snd_sf_id,
                self.snd_sf_fc,
                self.snd_sf_on,
                self.use_num_kp,
            ]),
        )?;
        Ok([
            0,
            self.bit_stream_timeout,
            self.id_hold_timeout,
            self.id_lockout_time,
            self.usb_key_press_time,
            self.usb_key_release_time,
            flags,
            0,
        ])
    }

    pub fn decode(bytes: PageBytes) -> Result<Self, PcProxError> {
        let flags = unpack_bits(bytes[6], FLAGS);
        Ok(Self {
            bit_stream_timeout: bytes[1],
            id_hold_timeout: bytes[2],
            id_lockout_time: bytes[3],
            usb_key_press_time: bytes[4],
            usb_key_release_time: bytes[5],
            use_64_bit: bit(&flags, 0),
            prx_pro_em: bit(&flags, 1),
            snd_sf_id: bit(&flags, 2),
            snd_sf_fc: bit(&flags, 3),
            snd_sf_on: bit(&flags, 4),
            use_num_kp: bit(&flags, 5),
        })
    }

    pub fn bit_stream_timeout(&self) -> Duration {
        Duration::from_millis(self.bit_stream_timeout as u64 * TIMING_UNIT_4MS)
    }

    pub fn id_hold_timeout(&self) -> Duration {
        Duration::from_millis(self.id_hold_timeout as u64 * TIMING_UNIT_50MS)
    }

    pub fn id_lockout_time(&self) -> Duration {
        Duration::from_millis(self.id_lockout_time as u64 * TIMING_UNIT_50MS)
    }

    pub fn usb_key_press_time(&self) -> Duration {
        Duration::from_millis(self.usb_key_press_time as u64 * TIMING_UNIT_4MS)
    }

    pub fn usb_key_release_time(&self) -> Duration {
        Duration::from_millis(self.usb_key_release_time as u64 * TIMING_UNIT_4MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_bytes_zeroed() {
        // Unknown byte 0, byte 7 and flag bits 0 and 2 are dropped on re-encode.
        let page = Page1::decode([0xAA, 0x10, 0x14, 0x0a, 0x05, 0x06, 0xFF, 0x55]).unwrap();
        assert!(page.use_64_bit && page.prx_pro_em && page.use_num_kp);
        assert_eq!(page.encode().unwrap(), [0x00, 0x10, 0x14, 0x0a, 0x05, 0x06, 0xFA, 0x00]);
    }

    #[test]
    fn test_timing_units() {
        let page = Page1 {
            bit_stream_timeout: 0x10,
            id_hold_timeout: 20,
            usb_key_release_time: 3,
            ..Default::default()
        };
        assert_eq!(page.bit_stream_timeout(), Duration::from_millis(64));
        assert_eq!(page.id_hold_timeout(), Duration::from_secs(1));
        assert_eq!(page.usb_key_release_time(), Duration::from_millis(12));
    }
}
