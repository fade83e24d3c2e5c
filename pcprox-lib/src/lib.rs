//! Host-side protocol engine for RF IDeas pcProx USB card readers.
//!
//! The reader is configured and polled through 8-byte HID feature reports.
//! This crate encodes and decodes those frames and drives the select /
//! read-or-write / finish sequence the reader requires.

pub mod bitfield;
pub mod card;
pub mod config;
pub mod constants;
pub mod device_info;
pub mod error;
pub mod frame;
pub mod sequencer;
pub mod transport;

pub use card::{CardLayout, CardScan, ParityBits};
pub use config::{Configuration, Page, Page0, Page1, Page2, PageNumber, PersistMask};
pub use device_info::DeviceInfo;
pub use error::{PcProxError, TransportError};
pub use sequencer::{PcProx, RawQuery, State};
pub use transport::{Transport, TransportConfig, UsbHidTransport};
