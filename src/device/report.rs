
use super::raw::{MouseStatus, Resolution, StatusFlags};

/// One movement sample.
///
/// Button and overflow bits are left in `status` for the caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MovementReport {
    pub status: MouseStatus,
    pub dx: i16,
    pub dy: i16,
}

impl MovementReport {
    pub fn from_bytes(status: u8, x: u8, y: u8) -> Self {
        let status = MouseStatus::from_bits_truncate(status);

        Self {
            status,
            dx: movement(x, status, MouseStatus::X_SIGN),
            dy: movement(y, status, MouseStatus::Y_SIGN),
        }
    }
}

/// 9-bit two's complement movement value. The ninth bit is the sign
/// bit in the status byte.
pub fn movement(magnitude: u8, status: MouseStatus, sign: MouseStatus) -> i16 {
    let mut value = magnitude as u16;
    if status.contains(sign) {
        value |= 0xFF00;
    }

    value as i16
}

/// Response to a status request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceStatus {
    pub flags: StatusFlags,
    /// Raw resolution byte.
    pub resolution: u8,
    /// Samples per second.
    pub sample_rate: u8,
}

impl DeviceStatus {
    pub fn from_bytes(flags: u8, resolution: u8, sample_rate: u8) -> Self {
        Self {
            flags: StatusFlags::from_bits_truncate(flags),
            resolution,
            sample_rate,
        }
    }

    pub fn resolution(&self) -> Option<Resolution> {
        Resolution::from_raw(self.resolution)
    }
}
