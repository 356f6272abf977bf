use bitflags::bitflags;

/// Commands sent to the mouse.
#[derive(Debug)]
pub struct ToMouse;

impl ToMouse {
    pub const SET_SCALING_1_1: u8 = 0xE6;
    pub const SET_SCALING_2_1: u8 = 0xE7;
    /// Resolution byte follows.
    pub const SET_RESOLUTION: u8 = 0xE8;
    pub const STATUS_REQUEST: u8 = 0xE9;
    pub const SET_STREAM_MODE: u8 = 0xEA;
    pub const READ_DATA: u8 = 0xEB;
    pub const SET_REMOTE_MODE: u8 = 0xF0;
    pub const GET_DEVICE_ID: u8 = 0xF2;
    /// Sample rate byte follows.
    pub const SET_SAMPLE_RATE: u8 = 0xF3;
    pub const ENABLE_DATA_REPORTING: u8 = 0xF4;
    pub const DISABLE_DATA_REPORTING: u8 = 0xF5;
    pub const RESET: u8 = 0xFF;
}

#[derive(Debug)]
pub struct FromMouse;

impl FromMouse {
    pub const ACK: u8 = 0xFA;
    pub const BAT_COMPLETION_CODE: u8 = 0xAA;
    pub const BAT_FAILURE_CODE: u8 = 0xFC;
    pub const ID_STANDARD_MOUSE: u8 = 0x00;
}

/// Host side delays for mouse commands.
#[derive(Debug)]
pub struct MouseDelay;

impl MouseDelay {
    pub const POWER_UP_MS: u32 = 20;
    pub const RESET_MS: u32 = 20;
    pub const SETTLE_US: u32 = 100;
}

bitflags! {
    /// First byte of a movement report.
    pub struct MouseStatus: u8 {
        const LEFT_BUTTON = 0b0000_0001;
        const RIGHT_BUTTON = 0b0000_0010;
        const MIDDLE_BUTTON = 0b0000_0100;
        const ALWAYS_ONE = 0b0000_1000;
        const X_SIGN = 0b0001_0000;
        const Y_SIGN = 0b0010_0000;
        const X_OVERFLOW = 0b0100_0000;
        const Y_OVERFLOW = 0b1000_0000;
    }
}

impl MouseStatus {
    pub fn buttons(&self) -> MouseStatus {
        *self & (MouseStatus::LEFT_BUTTON | MouseStatus::RIGHT_BUTTON | MouseStatus::MIDDLE_BUTTON)
    }

    pub fn overflow(&self) -> bool {
        self.intersects(MouseStatus::X_OVERFLOW | MouseStatus::Y_OVERFLOW)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MouseStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "MouseStatus({=u8:#b})", self.bits())
    }
}

bitflags! {
    /// First byte of a status request response.
    pub struct StatusFlags: u8 {
        const RIGHT_BUTTON = 0b0000_0001;
        const MIDDLE_BUTTON = 0b0000_0010;
        const LEFT_BUTTON = 0b0000_0100;
        const SCALING_2_1 = 0b0001_0000;
        const DATA_REPORTING = 0b0010_0000;
        const REMOTE_MODE = 0b0100_0000;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "StatusFlags({=u8:#b})", self.bits())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Resolution {
    CountsPerMm1 = 0,
    CountsPerMm2 = 1,
    /// Default value.
    CountsPerMm4 = 2,
    CountsPerMm8 = 3,
}

impl Resolution {
    pub fn from_raw(value: u8) -> Option<Self> {
        let resolution = match value {
            0 => Resolution::CountsPerMm1,
            1 => Resolution::CountsPerMm2,
            2 => Resolution::CountsPerMm4,
            3 => Resolution::CountsPerMm8,
            _ => return None,
        };

        Some(resolution)
    }
}

/// Samples per second.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleRate(u8);

impl SampleRate {
    pub const RATE_10: SampleRate = SampleRate(10);
    pub const RATE_20: SampleRate = SampleRate(20);
    pub const RATE_40: SampleRate = SampleRate(40);
    pub const RATE_60: SampleRate = SampleRate(60);
    pub const RATE_80: SampleRate = SampleRate(80);
    /// Default value.
    pub const RATE_100: SampleRate = SampleRate(100);
    pub const RATE_200: SampleRate = SampleRate(200);

    /// `None` if mouse doesn't support `value`.
    pub fn new(value: u8) -> Option<Self> {
        match value {
            10 | 20 | 40 | 60 | 80 | 100 | 200 => Some(SampleRate(value)),
            _ => None,
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}
