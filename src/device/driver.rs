
use core::fmt;

use log::{debug, info, warn};

use crate::error::Error;
use crate::transport::{
    driver::{
        timeout::{StartWindow, TimeoutPolicy},
        Transport,
    },
    io::{LineIO, Timing},
};

use super::raw::{FromMouse, MouseDelay, MouseStatus, Resolution, SampleRate, ToMouse};
use super::report::{movement, DeviceStatus, MovementReport};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mouse sends a movement report only when asked.
    Remote,
    /// Mouse sends movement reports on its own when data
    /// reporting is enabled.
    Stream,
}

/// Default value is `Remote`.
impl Default for Mode {
    fn default() -> Self {
        Mode::Remote
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Mode of a new `Mouse`. Later `initialize` calls keep
    /// the current mode.
    pub mode: Mode,
    pub timeout: TimeoutPolicy,
    pub start_window: StartWindow,
}

/// PS/2 mouse on a clock and data line pair.
pub struct Mouse<G: LineIO, T: Timing> {
    transport: Transport<G, T>,
    config: Config,
    mode: Mode,
    initialized: bool,
    reporting_enabled: bool,
}

impl <G: LineIO, T: Timing> fmt::Debug for Mouse<G, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Mouse")
            .field("mode", &self.mode)
            .field("initialized", &self.initialized)
            .field("reporting_enabled", &self.reporting_enabled)
            .finish()
    }
}

impl <G: LineIO, T: Timing> Mouse<G, T> {
    pub fn new(gpio: G, timing: T, clock: G::PinId, data: G::PinId, mode: Mode) -> Self {
        Self::with_config(gpio, timing, clock, data, Config { mode, ..Config::default() })
    }

    pub fn with_config(gpio: G, timing: T, clock: G::PinId, data: G::PinId, config: Config) -> Self {
        Self {
            transport: Transport::new(gpio, timing, clock, data, config.timeout, config.start_window),
            config,
            mode: config.mode,
            initialized: false,
            reporting_enabled: false,
        }
    }

    /// Reset the mouse and set the configured mode.
    ///
    /// Returns `Error::SelfTest` if the mouse self test fails. In that
    /// case no other commands are sent. There is no retry.
    pub fn initialize(&mut self) -> Result<(), Error> {
        self.transport.release_lines();
        self.transport.delay_ms(MouseDelay::POWER_UP_MS);

        self.send(ToMouse::RESET)?;
        // Reset disabled data reporting.
        self.initialized = false;
        self.reporting_enabled = false;

        let bat = self.transport.receive_byte()?;
        let id = self.transport.receive_byte()?;
        self.transport.delay_ms(MouseDelay::RESET_MS);

        if bat != FromMouse::BAT_COMPLETION_CODE {
            warn!("ps2 mouse: self test failed with {:#04x}", bat);
            return Err(Error::SelfTest(bat));
        }

        debug!("ps2 mouse: device id {:#04x}", id);

        match self.mode {
            Mode::Remote => self.set_remote_mode()?,
            Mode::Stream => self.enable_data_reporting()?,
        }

        self.transport.delay_us(MouseDelay::SETTLE_US);
        self.initialized = true;

        info!("ps2 mouse: initialized in {:?} mode", self.mode);

        Ok(())
    }

    pub fn set_remote_mode(&mut self) -> Result<(), Error> {
        self.mode_command(ToMouse::SET_REMOTE_MODE)?;
        self.mode = Mode::Remote;
        Ok(())
    }

    pub fn set_stream_mode(&mut self) -> Result<(), Error> {
        self.mode_command(ToMouse::SET_STREAM_MODE)?;
        self.mode = Mode::Stream;
        Ok(())
    }

    pub fn set_scaling_2_1(&mut self) -> Result<(), Error> {
        self.mode_command(ToMouse::SET_SCALING_2_1)
    }

    pub fn set_scaling_1_1(&mut self) -> Result<(), Error> {
        self.mode_command(ToMouse::SET_SCALING_1_1)
    }

    /// Only has an effect in stream mode. Does nothing if
    /// data reporting is already enabled.
    pub fn enable_data_reporting(&mut self) -> Result<(), Error> {
        if !self.reporting_enabled {
            self.send(ToMouse::ENABLE_DATA_REPORTING)?;
            self.reporting_enabled = true;
        }

        Ok(())
    }

    /// Disabled data reporting makes stream mode behave like remote mode.
    /// Does nothing if data reporting is already disabled.
    pub fn disable_data_reporting(&mut self) -> Result<(), Error> {
        if self.reporting_enabled {
            self.send(ToMouse::DISABLE_DATA_REPORTING)?;
            self.reporting_enabled = false;
        }

        Ok(())
    }

    /// In stream mode data reporting is enabled before the command and
    /// disabled after it. This is the reverse of the other commands.
    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), Error> {
        let stream = self.mode == Mode::Stream;

        if stream {
            self.enable_data_reporting()?;
        }

        self.send(ToMouse::SET_RESOLUTION)?;
        self.send(resolution as u8)?;

        if stream {
            self.disable_data_reporting()?;
        }

        self.transport.delay_us(MouseDelay::SETTLE_US);

        Ok(())
    }

    pub fn set_sample_rate(&mut self, rate: SampleRate) -> Result<(), Error> {
        let suspend = self.reporting_suspended();

        if suspend {
            self.disable_data_reporting()?;
        }

        self.send(ToMouse::SET_SAMPLE_RATE)?;
        self.send(rate.value())?;

        if suspend {
            self.enable_data_reporting()?;
        }

        self.transport.delay_us(MouseDelay::SETTLE_US);

        Ok(())
    }

    pub fn read_device_id(&mut self) -> Result<u8, Error> {
        self.with_reporting_suspended(|mouse| {
            mouse.send(ToMouse::GET_DEVICE_ID)?;
            mouse.transport.receive_byte()
        })
    }

    pub fn status_request(&mut self) -> Result<DeviceStatus, Error> {
        self.with_reporting_suspended(|mouse| {
            mouse.send(ToMouse::STATUS_REQUEST)?;
            let flags = mouse.transport.receive_byte()?;
            let resolution = mouse.transport.receive_byte()?;
            let sample_rate = mouse.transport.receive_byte()?;

            Ok(DeviceStatus::from_bytes(flags, resolution, sample_rate))
        })
    }

    /// Read one movement report.
    ///
    /// In remote mode the mouse is polled first. In stream mode call this
    /// only when the mouse has a report to send, otherwise this waits
    /// until it does.
    pub fn report(&mut self) -> Result<MovementReport, Error> {
        if self.mode == Mode::Remote {
            self.send(ToMouse::READ_DATA)?;
        }

        let status = MouseStatus::from_bits_truncate(self.transport.receive_byte()?);
        let dx = self.read_movement(status, MouseStatus::X_SIGN)?;
        let dy = self.read_movement(status, MouseStatus::Y_SIGN)?;

        Ok(MovementReport { status, dx, dy })
    }

    /// Send a raw byte. The acknowledge must be read with `read_byte`.
    pub fn write_byte(&mut self, data: u8) -> Result<(), Error> {
        self.transport.transmit_byte(data)
    }

    pub fn read_byte(&mut self) -> Result<u8, Error> {
        self.transport.receive_byte()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_reporting_enabled(&self) -> bool {
        self.reporting_enabled
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn clock_pin(&self) -> G::PinId {
        self.transport.clock_pin()
    }

    pub fn data_pin(&self) -> G::PinId {
        self.transport.data_pin()
    }

    pub fn release(self) -> (G, T) {
        self.transport.free()
    }

    /// Transmit a byte and read the acknowledge.
    fn send(&mut self, data: u8) -> Result<u8, Error> {
        self.transport.transmit_byte(data)?;
        let response = self.transport.receive_byte()?;

        if response != FromMouse::ACK {
            warn!("ps2 mouse: {:#04x} answered with {:#04x}", data, response);
        }

        Ok(response)
    }

    fn read_movement(&mut self, status: MouseStatus, sign: MouseStatus) -> Result<i16, Error> {
        let magnitude = self.transport.receive_byte()?;
        Ok(movement(magnitude, status, sign))
    }

    fn mode_command(&mut self, command: u8) -> Result<(), Error> {
        debug!("ps2 mouse: command {:#04x}", command);
        self.with_reporting_suspended(|mouse| mouse.send(command).map(|_| ()))
    }

    /// Stream mode reports can't be mixed with command responses.
    fn with_reporting_suspended<R, F>(&mut self, f: F) -> Result<R, Error>
        where F: FnOnce(&mut Self) -> Result<R, Error>
    {
        let suspend = self.reporting_suspended();

        if suspend {
            self.disable_data_reporting()?;
        }

        let result = f(self)?;

        if suspend {
            self.enable_data_reporting()?;
        }

        if self.initialized {
            self.transport.delay_us(MouseDelay::SETTLE_US);
        }

        Ok(result)
    }

    fn reporting_suspended(&self) -> bool {
        self.mode == Mode::Stream && self.reporting_enabled
    }
}
