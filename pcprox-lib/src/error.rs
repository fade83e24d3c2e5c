use thiserror::Error;

use crate::sequencer::State;

/// Failures reported by a [`Transport`](crate::transport::Transport).
///
/// These are passed through the sequencer unchanged.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("USB device not found. Is the pcProx reader connected?")]
    DeviceNotFound,

    #[error("USB error: {0}")]
    Usb(#[from] nusb::Error),

    #[error("USB transfer error: {0}")]
    Transfer(#[from] nusb::transfer::TransferError),

    #[error("Timeout during USB operation: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("Device disconnected")]
    Disconnected,
}

/// The primary error type for the `pcprox-lib` library.
#[derive(Error, Debug)]
pub enum PcProxError {
    #[error("Value {value} does not fit in a {width}-bit field")]
    Range { width: u8, value: u32 },

    #[error("Invalid length: expected {expected}, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Operation `{operation}` is not allowed in state {state:?}")]
    Sequence { operation: &'static str, state: State },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unknown configuration option: {0}")]
    UnknownOption(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
