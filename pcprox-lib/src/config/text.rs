//! Named access to configuration fields, using the option names and the
//! section layout of the vendor's configuration files.
//!
//! ```text
//! / tsIDBitCnts
//! iLeadParityBitCnt = 1
//! iTrailParityBitCnt = 1
//! ...
//! ```
//!
//! Timing options are expressed in milliseconds here; the page records keep
//! the raw register values.

use std::fmt::Write;

use crate::config::Configuration;
use crate::constants::{TIMING_UNIT_4MS, TIMING_UNIT_50MS};
use crate::error::PcProxError;

/// Sections and the options they list, in dump order.
pub const SECTIONS: &[(&str, &[&str])] = &[
    (
        "tsIDBitCnts",
        &["iLeadParityBitCnt", "iTrailParityBitCnt", "iIDBitCnt", "iTotalBitCnt"],
    ),
    (
        "tsCfgFlags",
        &[
            "bFixLenDsp",
            "bFrcBitCntEx",
            "bStripFac",
            "bSndFac",
            "bUseDelFac2Id",
            "bNoUseELChar",
            "bSndOnRx",
            "bHaltKBSnd",
        ],
    ),
    (
        "tsIDDispParms",
        &["iFACIDDelim", "iELDelim", "iIDDispLen", "iFACDispLen"],
    ),
    (
        "tsTimeParms",
        &["iBitStrmTO", "iIDHoldTO", "iIDLockOutTm", "iUSBKeyPrsTm", "iUSBKeyRlsTm"],
    ),
    (
        "tsCfgFlags2",
        &[
            "bUseLeadChrs",
            "bDspHex",
            "bWiegInvData",
            "bUseInvDataF",
            "bRevWiegBits",
            "bBeepID",
            "bRevBytes",
        ],
    ),
    (
        "tsCfgFlags3",
        &["bUseNumKP", "bSndSFON", "bSndSFFC", "bSndSFID", "bPrxProEm", "bUse64Bit"],
    ),
    (
        "tsIDDispParms2",
        &["iLeadChrCnt", "iLeadChr0", "iLeadChr1", "iLeadChr2", "iCrdGnChr0", "iCrdGnChr1"],
    ),
    (
        "tsIDDispParms3",
        &["iTrailChrCnt", "iTrailChr0", "iTrailChr1", "iTrailChr2"],
    ),
    ("tsLEDCtrl", &["bAppCtrlsLED", "iRedLEDState", "iGrnLEDState"]),
    ("tsBprRlyCtrl", &["iBeeperState", "iRelayState"]),
];

fn check(width: u8, max: u32, value: u32) -> Result<u32, PcProxError> {
    if value > max {
        return Err(PcProxError::Range { width, value });
    }
    Ok(value)
}

trait Kind {
    type Slot;
    fn get(slot: &Self::Slot) -> u32;
    fn set(slot: &mut Self::Slot, value: u32) -> Result<(), PcProxError>;
}

struct Flag;
struct Byte;
struct Nibble;
struct Millis<const UNIT: u64>;

impl Kind for Flag {
    type Slot = bool;
    fn get(slot: &bool) -> u32 {
        *slot as u32
    }
    fn set(slot: &mut bool, value: u32) -> Result<(), PcProxError> {
        *slot = check(1, 1, value)? != 0;
        Ok(())
    }
}

impl Kind for Byte {
    type Slot = u8;
    fn get(slot: &u8) -> u32 {
        *slot as u32
    }
    fn set(slot: &mut u8, value: u32) -> Result<(), PcProxError> {
        *slot = check(8, 0xFF, value)? as u8;
        Ok(())
    }
}

impl Kind for Nibble {
    type Slot = u8;
    fn get(slot: &u8) -> u32 {
        *slot as u32
    }
    fn set(slot: &mut u8, value: u32) -> Result<(), PcProxError> {
        *slot = check(4, 0x0F, value)? as u8;
        Ok(())
    }
}

impl<const UNIT: u64> Kind for Millis<UNIT> {
    type Slot = u8;
    fn get(slot: &u8) -> u32 {
        (*slot as u64 * UNIT) as u32
    }
    // Truncates to the register's resolution.
    fn set(slot: &mut u8, value: u32) -> Result<(), PcProxError> {
        *slot = (check(8, (0xFF * UNIT) as u32, value)? / UNIT as u32) as u8;
        Ok(())
    }
}

macro_rules! plain_options {
    ($($name:literal => $kind:ty, $page:ident . $field:ident;)*) => {
        fn get_plain(cfg: &Configuration, name: &str) -> Option<u32> {
            match name {
                $($name => Some(<$kind as Kind>::get(&cfg.$page.$field)),)*
                _ => None,
            }
        }

        fn set_plain(cfg: &mut Configuration, name: &str, value: u32) -> Option<Result<(), PcProxError>> {
            match name {
                $($name => Some(<$kind as Kind>::set(&mut cfg.$page.$field, value)),)*
                _ => None,
            }
        }
    };
}

plain_options! {
    "iLeadParityBitCnt" => Nibble, page0.lead_parity_bit_count;
    "iTrailParityBitCnt" => Nibble, page0.trail_parity_bit_count;
    "iIDBitCnt" => Byte, page0.id_bit_count;
    "iTotalBitCnt" => Byte, page0.total_bit_count;
    "bFixLenDsp" => Flag, page0.fix_len_dsp;
    "bFrcBitCntEx" => Flag, page0.frc_bit_cnt_ex;
    "bStripFac" => Flag, page0.strip_fac;
    "bSndFac" => Flag, page0.snd_fac;
    "bUseDelFac2Id" => Flag, page0.use_del_fac2_id;
    "bNoUseELChar" => Flag, page0.no_use_el_char;
    "bSndOnRx" => Flag, page0.snd_on_rx;
    "bHaltKBSnd" => Flag, page0.halt_kb_snd;
    "iFACIDDelim" => Byte, page0.fac_id_delim;
    "iELDelim" => Byte, page0.el_delim;
    "iIDDispLen" => Byte, page0.id_disp_len;
    "iFACDispLen" => Byte, page0.fac_disp_len;
    "iBitStrmTO" => Millis<TIMING_UNIT_4MS>, page1.bit_stream_timeout;
    "iIDHoldTO" => Millis<TIMING_UNIT_50MS>, page1.id_hold_timeout;
    "iIDLockOutTm" => Millis<TIMING_UNIT_50MS>, page1.id_lockout_time;
    "iUSBKeyPrsTm" => Millis<TIMING_UNIT_4MS>, page1.usb_key_press_time;
    "iUSBKeyRlsTm" => Millis<TIMING_UNIT_4MS>, page1.usb_key_release_time;
    "bUseLeadChrs" => Flag, page2.use_lead_chrs;
    "bDspHex" => Flag, page2.dsp_hex;
    "bWiegInvData" => Flag, page2.wieg_inv_data;
    "bUseInvDataF" => Flag, page2.use_inv_data_f;
    "bRevWiegBits" => Flag, page2.rev_wieg_bits;
    "bBeepID" => Flag, page2.beep_id;
    "bRevBytes" => Flag, page2.rev_bytes;
    "bUseNumKP" => Flag, page1.use_num_kp;
    "bSndSFON" => Flag, page1.snd_sf_on;
    "bSndSFFC" => Flag, page1.snd_sf_fc;
    "bSndSFID" => Flag, page1.snd_sf_id;
    "bPrxProEm" => Flag, page1.prx_pro_em;
    "bUse64Bit" => Flag, page1.use_64_bit;
    "iCrdGnChr0" => Byte, page2.card_gen_char0;
    "iCrdGnChr1" => Byte, page2.card_gen_char1;
    "bAppCtrlsLED" => Flag, page2.app_ctrls_led;
    "iRedLEDState" => Flag, page2.red_led;
    "iGrnLEDState" => Flag, page2.green_led;
    "iBeeperState" => Flag, page2.beeper;
    "iRelayState" => Flag, page2.relay;
}

/// Which character run an option addresses.
#[derive(Clone, Copy)]
enum Chars {
    Lead,
    Trail,
}

fn char_option(name: &str) -> Option<(Chars, Option<usize>)> {
    let (run, rest) = if let Some(rest) = name.strip_prefix("iLeadChr") {
        (Chars::Lead, rest)
    } else if let Some(rest) = name.strip_prefix("iTrailChr") {
        (Chars::Trail, rest)
    } else {
        return None;
    };
    match rest {
        "Cnt" => Some((run, None)),
        "0" => Some((run, Some(0))),
        "1" => Some((run, Some(1))),
        "2" => Some((run, Some(2))),
        _ => None,
    }
}

fn get_chars(cfg: &Configuration, run: Chars, index: Option<usize>) -> u32 {
    let chars = match run {
        Chars::Lead => cfg.page2.lead_chars(),
        Chars::Trail => cfg.page2.trail_chars(),
    };
    match index {
        None => chars.len() as u32,
        Some(i) => chars.get(i).copied().unwrap_or(0) as u32,
    }
}

fn set_chars(cfg: &mut Configuration, run: Chars, index: Option<usize>, value: u32) -> Result<(), PcProxError> {
    let page = &mut cfg.page2;
    let mut lead = page.lead_chars().to_vec();
    let mut trail = page.trail_chars().to_vec();
    let target = match run {
        Chars::Lead => &mut lead,
        Chars::Trail => &mut trail,
    };
    match index {
        None => target.resize(check(4, 0x0F, value)? as usize, 0),
        Some(i) => {
            let byte = check(8, 0xFF, value)? as u8;
            let slot = target.get_mut(i).ok_or_else(|| {
                PcProxError::Constraint(format!("character {i} is beyond the configured count"))
            })?;
            *slot = byte;
        }
    }
    page.set_chars(&lead, &trail)
}

/// Look up an option by its vendor name.
pub fn get(cfg: &Configuration, name: &str) -> Result<u32, PcProxError> {
    if let Some((run, index)) = char_option(name) {
        return Ok(get_chars(cfg, run, index));
    }
    get_plain(cfg, name).ok_or_else(|| PcProxError::UnknownOption(name.to_string()))
}

/// Set an option by its vendor name. On error the configuration is unchanged.
pub fn set(cfg: &mut Configuration, name: &str, value: u32) -> Result<(), PcProxError> {
    if let Some((run, index)) = char_option(name) {
        return set_chars(cfg, run, index, value);
    }
    set_plain(cfg, name, value).unwrap_or_else(|| Err(PcProxError::UnknownOption(name.to_string())))
}

/// Render the whole configuration, one `name = value` line per option.
pub fn dump(cfg: &Configuration) -> String {
    let mut out = String::new();
    for (section, names) in SECTIONS {
        let _ = writeln!(out, "/ {section}");
        for name in *names {
            let value = get(cfg, name).unwrap_or_default();
            let _ = writeln!(out, "{name} = {value}");
        }
        out.push('\n');
    }
    out
}
