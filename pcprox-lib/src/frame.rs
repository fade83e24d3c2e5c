use crate::constants::{FRAME_SIZE, PARAM_SIZE};
use crate::error::PcProxError;
use num_enum::{FromPrimitive, IntoPrimitive};
use std::fmt;
use strum_macros::Display;

/// A raw 8-byte feature report.
pub type Frame = [u8; FRAME_SIZE];

/// Command codes understood by the reader (byte 0 of an outbound frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoPrimitive, FromPrimitive)]
#[repr(u8)]
pub enum CommandCode {
    SelectPage0 = 0x80,
    SelectPage1 = 0x81,
    SelectPage2 = 0x82,
    /// Get-only, contents undocumented
    ReadPage3 = 0x83,
    /// Get-only, contents undocumented
    ReadPage5 = 0x85,
    DeviceInfo = 0x8a,
    /// Extended configuration query, parameter bytes select the block
    ExtendedQuery = 0x8c,
    /// Card buffer 1: bit count header
    CardBuffer1 = 0x8e,
    /// Card buffer 0: card data
    CardBuffer0 = 0x8f,
    FinishConfig = 0x90,

    #[num_enum(catch_all)]
    Unknown(u8),
}

/// Build a command frame from a code and up to 7 parameter bytes.
pub fn encode_command(code: impl Into<u8>, params: &[u8]) -> Result<Frame, PcProxError> {
    if params.len() > PARAM_SIZE {
        return Err(PcProxError::Length {
            expected: PARAM_SIZE,
            actual: params.len(),
        });
    }
    let mut frame = [0u8; FRAME_SIZE];
    frame[0] = code.into();
    frame[1..1 + params.len()].copy_from_slice(params);
    Ok(frame)
}

/// An inbound frame. Its meaning depends on the command that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response(pub Frame);

/// Name the boundary between transport bytes and a decoder.
pub fn decode_response(frame: Frame) -> Response {
    Response(frame)
}

impl Response {
    pub fn as_bytes(&self) -> &Frame {
        &self.0
    }

    /// All-zero replies mean the reader has nothing to report.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl From<Response> for Frame {
    fn from(response: Response) -> Self {
        response.0
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
