//! Waiting for device driven clock edges.

use crate::error::{Error, Phase};
use crate::transport::io::{LineIO, Timing};

/// Limits used by [`TimeoutPolicy::Bounded`], in microseconds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeouts {
    /// Device starting a frame or answering a request to send.
    /// Reset self test can take over 500 ms.
    pub response_micros: u32,
    /// Every clock edge inside a frame.
    pub bit_micros: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            response_micros: 1_000_000,
            bit_micros: 2_000,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeoutPolicy {
    /// Wait forever. A disconnected device hangs the driver.
    Unbounded,
    /// Return [`Error::Timeout`] when a wait takes too long.
    Bounded(Timeouts),
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        TimeoutPolicy::Unbounded
    }
}

impl TimeoutPolicy {
    pub(crate) fn response(&self) -> Option<u32> {
        match self {
            TimeoutPolicy::Unbounded => None,
            TimeoutPolicy::Bounded(timeouts) => Some(timeouts.response_micros),
        }
    }

    pub(crate) fn bit(&self) -> Option<u32> {
        match self {
            TimeoutPolicy::Unbounded => None,
            TimeoutPolicy::Bounded(timeouts) => Some(timeouts.bit_micros),
        }
    }
}

/// First wait of a device to host frame, for the clock to go low.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartWindow {
    /// Wait according to the [`TimeoutPolicy`].
    Blocking,
    /// Stop polling after `micros` and continue reading the frame even
    /// if the device has not started it yet. The frame is then read with
    /// the start bit as the first data bit.
    Soft { micros: u32 },
}

impl StartWindow {
    pub const LEGACY: StartWindow = StartWindow::Soft { micros: 25 };
}

impl Default for StartWindow {
    fn default() -> Self {
        StartWindow::Blocking
    }
}

/// Poll `pin` while it reads `level`.
///
/// With `limit` set, gives up after `limit` microseconds and returns
/// `Error::Timeout(phase)`.
pub(crate) fn wait_while<G: LineIO, T: Timing>(
    gpio: &mut G,
    timing: &mut T,
    pin: G::PinId,
    level: bool,
    limit: Option<u32>,
    phase: Phase,
) -> Result<(), Error> {
    match limit {
        None => {
            while gpio.read_level(pin) == level {}
            Ok(())
        }
        Some(limit) => {
            if poll_while(gpio, timing, pin, level, limit) {
                Ok(())
            } else {
                Err(Error::Timeout(phase))
            }
        }
    }
}

/// Returns `false` if `pin` still reads `level` after `limit` microseconds.
pub(crate) fn poll_while<G: LineIO, T: Timing>(
    gpio: &mut G,
    timing: &mut T,
    pin: G::PinId,
    level: bool,
    limit: u32,
) -> bool {
    let start = timing.elapsed_micros();

    while gpio.read_level(pin) == level {
        if timing.elapsed_micros().wrapping_sub(start) >= limit {
            return false;
        }
    }

    true
}
