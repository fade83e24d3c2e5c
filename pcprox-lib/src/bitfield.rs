//! Sub-byte field packing.
//!
//! A byte is described by a [`Layout`]: an ordered list of [`Run`]s laid out
//! from bit 0 upward, least-significant bit first. Named runs carry a value;
//! unknown runs are never read and always packed as zero.
//!
//! ```
//! use pcprox_lib::bitfield::{pack_bits, unpack_bits, Run};
//!
//! const NIBBLES: &[Run] = &[Run::Field(4), Run::Field(4)];
//! let byte = pack_bits(NIBBLES, &[0x1, 0x2]).unwrap();
//! assert_eq!(byte, 0x21);
//! assert_eq!(unpack_bits(byte, NIBBLES), vec![0x1, 0x2]);
//! ```

use crate::error::PcProxError;

/// One contiguous run of bits inside a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Run {
    /// A named field `width` bits wide.
    Field(u8),
    /// Bits whose meaning is not known. Packed as zero, skipped on unpack.
    Unknown(u8),
}

impl Run {
    pub const fn width(&self) -> u8 {
        match self {
            Run::Field(w) | Run::Unknown(w) => *w,
        }
    }
}

pub type Layout = [Run];

/// Eight single-bit fields, bit 0 first.
pub const FLAGS8: &Layout = &[Run::Field(1); 8];

/// Two nibbles, low nibble first.
pub const NIBBLE_PAIR: &Layout = &[Run::Field(4), Run::Field(4)];

fn check_width(layout: &Layout) -> Result<(), PcProxError> {
    let total: u32 = layout.iter().map(|r| r.width() as u32).sum();
    if total > 8 {
        return Err(PcProxError::Range { width: 8, value: total });
    }
    Ok(())
}

fn field_count(layout: &Layout) -> usize {
    layout.iter().filter(|r| matches!(r, Run::Field(_))).count()
}

fn mask(width: u8) -> u16 {
    (1u16 << width) - 1
}

/// Pack `values` into one byte following `layout`.
///
/// `values` holds one entry per [`Run::Field`], in layout order.
pub fn pack_bits(layout: &Layout, values: &[u8]) -> Result<u8, PcProxError> {
    check_width(layout)?;
    let expected = field_count(layout);
    if values.len() != expected {
        return Err(PcProxError::Length {
            expected,
            actual: values.len(),
        });
    }

    let mut byte: u16 = 0;
    let mut shift = 0u8;
    let mut values = values.iter();
    for run in layout {
        if let Run::Field(width) = *run {
            // Cannot be None: the count was checked above.
            let value = *values.next().unwrap_or(&0) as u16;
            if value > mask(width) {
                return Err(PcProxError::Range {
                    width,
                    value: value as u32,
                });
            }
            byte |= value << shift;
        }
        shift += run.width();
    }
    Ok(byte as u8)
}

/// Unpack the named fields of `layout` from `byte`.
///
/// A malformed layout (wider than 8 bits) yields the fields that fit.
pub fn unpack_bits(byte: u8, layout: &Layout) -> Vec<u8> {
    let byte = byte as u16;
    let mut shift = 0u32;
    let mut values = Vec::with_capacity(layout.len());
    for run in layout {
        let width = run.width();
        if shift + width as u32 > 8 {
            break;
        }
        if let Run::Field(_) = run {
            values.push(((byte >> shift) & mask(width)) as u8);
        }
        shift += width as u32;
    }
    values
}

/// Convert flags to the 0/1 values `pack_bits` expects.
pub fn flags_to_bits(flags: &[bool]) -> Vec<u8> {
    flags.iter().map(|&f| f as u8).collect()
}

/// Read back a flag produced by [`unpack_bits`].
pub(crate) fn bit(values: &[u8], index: usize) -> bool {
    values.get(index).is_some_and(|&v| v != 0)
}
