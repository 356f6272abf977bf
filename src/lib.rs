
//! Driver for a PS/2 mouse connected to two general purpose IO lines.
//!
//! The host bit-bangs the PS/2 protocol: the device generates the clock,
//! the host samples or drives the data line on each clock edge and uses the
//! inhibit/request-to-send handshake when it needs to transmit.
//!
//! * [`transport`] - 11-bit frames (start bit, 8 data bits LSB first,
//!   odd parity, stop bit) over the clock and data lines.
//! * [`device`] - mouse commands and movement report decoding built on
//!   top of the transport.
//!
//! # Reference material
//! * <https://web.archive.org/web/20180202184002/http://www.computer-engineering.org/ps2protocol/>
//! * <https://web.archive.org/web/20180126024045/http://www.computer-engineering.org/ps2mouse/>
//! * <https://wiki.osdev.org/PS/2_Mouse>

#![no_std]
#![forbid(missing_debug_implementations)]

pub mod device;
pub mod error;
pub mod transport;

#[cfg(test)]
mod sim;

pub use device::driver::{Config, Mode, Mouse};
pub use device::raw::{MouseStatus, Resolution, SampleRate};
pub use device::report::{DeviceStatus, MovementReport};
pub use error::{Error, Phase};
pub use transport::driver::timeout::{StartWindow, TimeoutPolicy, Timeouts};
pub use transport::io::{Line, LineIO, MonotonicDelay, OpenDrainLines, Timing};
