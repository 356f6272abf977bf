//! Errors returned by the transport and the mouse driver.

use core::fmt;

/// Wait inside a transport exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Host released clock after the start bit and the device did not
    /// start clocking.
    RequestToSend,
    /// Device stopped clocking while the host was sending a frame.
    TransmitClock,
    /// Device did not acknowledge the frame sent by the host.
    LineAcknowledge,
    /// Device did not start sending a frame.
    FrameStart,
    /// Device stopped clocking while the host was receiving a frame.
    ReceiveClock,
}

/// Error from a transport exchange or a mouse command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Basic Assurance Test returned something else than `0xAA`.
    SelfTest(u8),
    /// Only returned with [`TimeoutPolicy::Bounded`](crate::TimeoutPolicy::Bounded).
    Timeout(Phase),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            Phase::RequestToSend => "request to send",
            Phase::TransmitClock => "transmit clock",
            Phase::LineAcknowledge => "line acknowledge",
            Phase::FrameStart => "frame start",
            Phase::ReceiveClock => "receive clock",
        };

        f.write_str(text)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::SelfTest(result) => write!(f, "mouse self test failed with {:#04x}", result),
            Error::Timeout(phase) => write!(f, "timeout while waiting for {}", phase),
        }
    }
}
