// Protocol constants for the pcProx reader

/// USB vendor ID (RF IDeas)
pub const VID: u16 = 0x0c27;

/// USB product ID of the pcProx HID keyboard-wedge readers
pub const PID: u16 = 0x3bfa;

/// Every feature report exchanged with the reader is exactly this long
pub const FRAME_SIZE: usize = 8;

/// Number of parameter bytes following the command code
pub const PARAM_SIZE: usize = FRAME_SIZE - 1;

/// A configuration page occupies a whole frame
pub const PAGE_SIZE: usize = FRAME_SIZE;

/// Number of configuration pages reachable through select-page
pub const PAGE_COUNT: u8 = 3;

/// Character slots shared by the leading and trailing characters of page 2
pub const SHARED_CHAR_SLOTS: usize = 3;

/// Page 1 timing unit for bit-stream timeout and USB key press/release
pub const TIMING_UNIT_4MS: u64 = 4;

/// Page 1 timing unit for ID hold timeout and lockout time
pub const TIMING_UNIT_50MS: u64 = 50;

/// HID class request: GET_REPORT
pub const HID_GET_REPORT: u8 = 0x01;

/// HID class request: SET_REPORT
pub const HID_SET_REPORT: u8 = 0x09;

/// HID report type "Feature", high byte of wValue
pub const HID_REPORT_TYPE_FEATURE: u16 = 0x03;
