use crate::bitfield::{NIBBLE_PAIR, unpack_bits};
use crate::error::PcProxError;
use crate::frame::Response;
use std::fmt;
use zerocopy::byteorder::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Wire layout of the device-info response.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct DeviceInfoRaw {
    pub reserved0: [u8; 2],
    pub version: u8, // low nibble minor, high nibble release
    pub major: u8,
    pub reserved4: u8,
    pub device_type: U16,
    pub reserved7: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceInfo {
    pub minor_version: u8,
    pub release_version: u8,
    pub major_version: u8,
    pub device_type: u16,
}

impl DeviceInfo {
    pub fn decode(response: &Response) -> Result<Self, PcProxError> {
        let raw = DeviceInfoRaw::ref_from_bytes(response.as_bytes().as_slice()).map_err(|_| {
            PcProxError::Length {
                expected: size_of::<DeviceInfoRaw>(),
                actual: response.as_bytes().len(),
            }
        })?;
        Ok(Self::from(*raw))
    }

    /// Firmware version as shown by the vendor tools, e.g. `07.3.0`.
    pub fn firmware_version(&self) -> String {
        format!(
            "{:02}.{}.{}",
            self.major_version, self.release_version, self.minor_version
        )
    }
}

impl From<DeviceInfoRaw> for DeviceInfo {
    fn from(raw: DeviceInfoRaw) -> Self {
        let version = unpack_bits(raw.version, NIBBLE_PAIR);
        DeviceInfo {
            minor_version: version[0],
            release_version: version[1],
            major_version: raw.major,
            device_type: raw.device_type.get(),
        }
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "firmware={}, device={:#06x}",
            self.firmware_version(),
            self.device_type
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::decode_response;

    #[test]
    fn test_decode_literal() {
        let info = DeviceInfo::decode(&decode_response([0x00, 0x00, 0x30, 0x07, 0x00, 0x34, 0x12, 0x00])).unwrap();
        assert_eq!(
            info,
            DeviceInfo {
                minor_version: 0,
                release_version: 3,
                major_version: 7,
                device_type: 0x1234,
            }
        );
        assert_eq!(info.firmware_version(), "07.3.0");
        assert_eq!(info.to_string(), "firmware=07.3.0, device=0x1234");
    }

    #[test]
    fn test_unknown_bytes_ignored() {
        let info = DeviceInfo::decode(&decode_response([0xff, 0xff, 0x21, 0x0c, 0xff, 0x01, 0x00, 0xff])).unwrap();
        assert_eq!(info.minor_version, 1);
        assert_eq!(info.release_version, 2);
        assert_eq!(info.major_version, 12);
        assert_eq!(info.device_type, 1);
    }
}
