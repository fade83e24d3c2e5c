//! Configuration page model.
//!
//! The reader keeps its configuration in three independently selectable
//! pages. Each page is a typed record mapped to and from a full frame.

mod page0;
mod page1;
mod page2;
pub mod text;

pub use page0::Page0;
pub use page1::Page1;
pub use page2::Page2;

use crate::constants::{PAGE_COUNT, PAGE_SIZE};
use crate::error::PcProxError;
use crate::frame::CommandCode;
use modular_bitfield::prelude::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw page payload.
pub type PageBytes = [u8; PAGE_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum PageNumber {
    #[strum(to_string = "page 0")]
    Page0 = 0,
    #[strum(to_string = "page 1")]
    Page1 = 1,
    #[strum(to_string = "page 2")]
    Page2 = 2,
}

impl PageNumber {
    pub const ALL: [PageNumber; PAGE_COUNT as usize] = [PageNumber::Page0, PageNumber::Page1, PageNumber::Page2];

    pub fn select_command(&self) -> CommandCode {
        match self {
            PageNumber::Page0 => CommandCode::SelectPage0,
            PageNumber::Page1 => CommandCode::SelectPage1,
            PageNumber::Page2 => CommandCode::SelectPage2,
        }
    }
}

/// Any one of the three pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Page {
    Page0(Page0),
    Page1(Page1),
    Page2(Page2),
}

impl Page {
    pub fn number(&self) -> PageNumber {
        match self {
            Page::Page0(_) => PageNumber::Page0,
            Page::Page1(_) => PageNumber::Page1,
            Page::Page2(_) => PageNumber::Page2,
        }
    }

    pub fn encode(&self) -> Result<PageBytes, PcProxError> {
        match self {
            Page::Page0(p) => p.encode(),
            Page::Page1(p) => p.encode(),
            Page::Page2(p) => p.encode(),
        }
    }

    pub fn decode(number: PageNumber, bytes: PageBytes) -> Result<Self, PcProxError> {
        Ok(match number {
            PageNumber::Page0 => Page::Page0(Page0::decode(bytes)?),
            PageNumber::Page1 => Page::Page1(Page1::decode(bytes)?),
            PageNumber::Page2 => Page::Page2(Page2::decode(bytes)?),
        })
    }
}

impl From<Page0> for Page {
    fn from(page: Page0) -> Self {
        Page::Page0(page)
    }
}

impl From<Page1> for Page {
    fn from(page: Page1) -> Self {
        Page::Page1(page)
    }
}

impl From<Page2> for Page {
    fn from(page: Page2) -> Self {
        Page::Page2(page)
    }
}

/// The complete reader configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Configuration {
    pub page0: Page0,
    pub page1: Page1,
    pub page2: Page2,
}

impl Configuration {
    pub fn page(&self, number: PageNumber) -> Page {
        match number {
            PageNumber::Page0 => self.page0.into(),
            PageNumber::Page1 => self.page1.into(),
            PageNumber::Page2 => self.page2.into(),
        }
    }

    pub fn set_page(&mut self, page: Page) {
        match page {
            Page::Page0(p) => self.page0 = p,
            Page::Page1(p) => self.page1 = p,
            Page::Page2(p) => self.page2 = p,
        }
    }
}

/// Parameter 0 of the finish-configuration command: which pages to write
/// to non-volatile storage.
#[bitfield(bytes = 1)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PersistMask {
    pub page0: bool,
    pub page1: bool,
    pub page2: bool,
    #[skip]
    unused: B5,
}

impl PersistMask {
    pub fn all() -> Self {
        Self::new().with_page0(true).with_page1(true).with_page2(true)
    }

    pub fn none() -> Self {
        Self::new()
    }

    pub fn for_page(number: PageNumber) -> Self {
        match number {
            PageNumber::Page0 => Self::new().with_page0(true),
            PageNumber::Page1 => Self::new().with_page1(true),
            PageNumber::Page2 => Self::new().with_page2(true),
        }
    }

    pub fn bits(&self) -> u8 {
        self.into_bytes()[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_mask_bits() {
        let mask = PersistMask::new().with_page0(true).with_page2(true);
        assert_eq!(mask.bits(), 0x05);
        assert_eq!(PersistMask::all().bits(), 0x07);
        assert_eq!(PersistMask::none().bits(), 0x00);
        assert_eq!(PersistMask::for_page(PageNumber::Page1).bits(), 0x02);
    }

    #[test]
    fn test_page_number_select_codes() {
        let codes: Vec<u8> = PageNumber::ALL.iter().map(|p| p.select_command().into()).collect();
        assert_eq!(codes, vec![0x80, 0x81, 0x82]);
        assert!(PageNumber::try_from(3u8).is_err());
    }
}
