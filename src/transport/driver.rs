
pub mod timeout;

use core::fmt;

use log::{trace, warn};

use crate::error::{Error, Phase};

use super::{
    io::{LineIO, Timing},
    raw::{Frame, HostDelay, DATA_BITS},
};

use self::timeout::{poll_while, wait_while, StartWindow, TimeoutPolicy};

/// Bit-banged PS/2 link over a clock line and a data line.
///
/// Every exchange ends with the host holding clock low, so the device
/// can't start a frame before the host is ready to receive it.
pub struct Transport<G: LineIO, T: Timing> {
    gpio: G,
    timing: T,
    clock: G::PinId,
    data: G::PinId,
    timeout: TimeoutPolicy,
    start_window: StartWindow,
}

impl <G: LineIO, T: Timing> fmt::Debug for Transport<G, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Transport")
    }
}

impl <G: LineIO, T: Timing> Transport<G, T> {
    pub fn new(gpio: G, timing: T, clock: G::PinId, data: G::PinId, timeout: TimeoutPolicy, start_window: StartWindow) -> Self {
        Self {
            gpio,
            timing,
            clock,
            data,
            timeout,
            start_window,
        }
    }

    /// Host to device frame.
    ///
    /// Device answers with a byte which must be read separately
    /// with `receive_byte`.
    pub fn transmit_byte(&mut self, value: u8) -> Result<(), Error> {
        trace!("ps2: transmit {:#04x}", value);

        let result = self.transmit_frame(value);
        self.hold_bus();
        result
    }

    /// Device to host frame. Parity and stop bits are not checked.
    pub fn receive_byte(&mut self) -> Result<u8, Error> {
        let result = self.receive_frame();
        self.hold_bus();
        result
    }

    fn transmit_frame(&mut self, value: u8) -> Result<(), Error> {
        let frame = Frame::new(value);

        self.gpio.release(self.data);
        self.gpio.release(self.clock);
        self.timing.delay_us(HostDelay::RELEASE);

        // Inhibit, then request to send.
        self.gpio.drive_low(self.clock);
        self.timing.delay_us(HostDelay::INHIBIT);
        self.gpio.drive_low(self.data);
        self.timing.delay_us(HostDelay::START_BIT);
        self.gpio.release(self.clock);

        let response = self.timeout.response();
        self.wait_clock(true, response, Phase::RequestToSend)?;

        // Data bits and parity. Device reads the data line when clock is high.
        for index in 1..=DATA_BITS + 1 {
            self.set_data(frame.bit(index));
            self.clock_cycle(Phase::TransmitClock)?;
        }

        // Stop bit
        self.gpio.release(self.data);
        self.timing.delay_us(HostDelay::ACKNOWLEDGE);

        let limit = self.timeout.bit();
        self.wait_clock(true, limit, Phase::LineAcknowledge)?;
        if self.gpio.read_level(self.data) {
            warn!("ps2: no line acknowledge for {:#04x}", value);
        }
        self.wait_lines_released(limit)
    }

    fn receive_frame(&mut self) -> Result<u8, Error> {
        self.gpio.release(self.clock);
        self.gpio.release(self.data);
        self.timing.delay_us(HostDelay::RECEIVE_RELEASE);

        match self.start_window {
            StartWindow::Blocking => {
                let response = self.timeout.response();
                self.wait_clock(true, response, Phase::FrameStart)?;
            }
            StartWindow::Soft { micros } => {
                if !poll_while(&mut self.gpio, &mut self.timing, self.clock, true, micros) {
                    trace!("ps2: start window of {} us expired", micros);
                }
            }
        }

        // Start bit
        self.timing.delay_us(HostDelay::START_BIT_EDGE);
        let limit = self.timeout.bit();
        self.wait_clock(false, limit, Phase::ReceiveClock)?;

        let mut data = 0u8;
        for i in 0..DATA_BITS {
            if self.read_bit()? {
                data |= 1 << i;
            }
        }

        let parity = self.read_bit()?;
        let stop = self.read_bit()?;

        let frame = Frame::received(data, parity, stop);
        if !frame.parity_ok() {
            warn!("ps2: parity error in {:#04x}", data);
        }
        if !frame.stop() {
            warn!("ps2: missing stop bit after {:#04x}", data);
        }

        trace!("ps2: received {:#04x}", data);

        Ok(data)
    }

    /// Sample data line on the next falling clock edge.
    pub fn read_bit(&mut self) -> Result<bool, Error> {
        let limit = self.timeout.bit();

        self.wait_clock(true, limit, Phase::ReceiveClock)?;
        let bit = self.gpio.read_level(self.data);
        self.wait_clock(false, limit, Phase::ReceiveClock)?;

        Ok(bit)
    }

    pub fn release_lines(&mut self) {
        self.gpio.release(self.clock);
        self.gpio.release(self.data);
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.timing.delay_ms(ms)
    }

    pub fn delay_us(&mut self, us: u32) {
        self.timing.delay_us(us)
    }

    pub fn clock_pin(&self) -> G::PinId {
        self.clock
    }

    pub fn data_pin(&self) -> G::PinId {
        self.data
    }

    pub fn free(self) -> (G, T) {
        (self.gpio, self.timing)
    }

    /// Inhibit the device until the next exchange, also after a timeout.
    fn hold_bus(&mut self) {
        self.gpio.release(self.data);
        self.gpio.drive_low(self.clock);
    }

    fn set_data(&mut self, bit: bool) {
        if bit {
            self.gpio.release(self.data);
        } else {
            self.gpio.drive_low(self.data);
        }
    }

    /// Clock goes high and then low again.
    fn clock_cycle(&mut self, phase: Phase) -> Result<(), Error> {
        let limit = self.timeout.bit();

        self.wait_clock(false, limit, phase)?;
        self.wait_clock(true, limit, phase)
    }

    fn wait_clock(&mut self, level: bool, limit: Option<u32>, phase: Phase) -> Result<(), Error> {
        wait_while(&mut self.gpio, &mut self.timing, self.clock, level, limit, phase)
    }

    /// Device releases clock and data after the line acknowledge.
    fn wait_lines_released(&mut self, limit: Option<u32>) -> Result<(), Error> {
        let start = self.timing.elapsed_micros();

        while !self.gpio.read_level(self.clock) || !self.gpio.read_level(self.data) {
            if let Some(limit) = limit {
                if self.timing.elapsed_micros().wrapping_sub(start) >= limit {
                    return Err(Error::Timeout(Phase::LineAcknowledge));
                }
            }
        }

        Ok(())
    }
}
