
use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

/// Role of a line in the PS/2 link.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    Clock,
    Data,
}

/// Open collector access to the clock and data pins.
///
/// Released lines are pulled high by an external pull-up unless the
/// device drives them low.
pub trait LineIO {
    type PinId: Copy;

    /// Configure pin as output with logic level low.
    fn drive_low(&mut self, pin: Self::PinId);

    /// Configure pin as input.
    fn release(&mut self, pin: Self::PinId);

    // Reading is `&mut self`, because most pin implementations require it.
    fn read_level(&mut self, pin: Self::PinId) -> bool;
}

/// Busy-wait delays and a free running microsecond counter.
pub trait Timing: DelayNs {
    /// Wrapping microsecond counter.
    fn elapsed_micros(&mut self) -> u32;
}

/// [`LineIO`] for two open-drain `embedded-hal` pins.
///
/// Setting an open-drain pin high lets it float, which is the released
/// state of a PS/2 line.
#[derive(Debug)]
pub struct OpenDrainLines<C, D> {
    clock: C,
    data: D,
}

impl <C, D> OpenDrainLines<C, D>
    where C: InputPin<Error=Infallible> + OutputPin<Error=Infallible>,
          D: InputPin<Error=Infallible> + OutputPin<Error=Infallible>
{
    pub fn new(clock: C, data: D) -> Self {
        Self { clock, data }
    }

    pub fn free(self) -> (C, D) {
        (self.clock, self.data)
    }
}

impl <C, D> LineIO for OpenDrainLines<C, D>
    where C: InputPin<Error=Infallible> + OutputPin<Error=Infallible>,
          D: InputPin<Error=Infallible> + OutputPin<Error=Infallible>
{
    type PinId = Line;

    fn drive_low(&mut self, pin: Line) {
        match pin {
            Line::Clock => infallible(self.clock.set_low()),
            Line::Data => infallible(self.data.set_low()),
        }
    }

    fn release(&mut self, pin: Line) {
        match pin {
            Line::Clock => infallible(self.clock.set_high()),
            Line::Data => infallible(self.data.set_high()),
        }
    }

    fn read_level(&mut self, pin: Line) -> bool {
        match pin {
            Line::Clock => infallible(self.clock.is_high()),
            Line::Data => infallible(self.data.is_high()),
        }
    }
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

/// [`Timing`] from a `DelayNs` implementation and a microsecond counter.
pub struct MonotonicDelay<D, F> {
    delay: D,
    micros: F,
}

impl <D: DelayNs, F: FnMut() -> u32> MonotonicDelay<D, F> {
    pub fn new(delay: D, micros: F) -> Self {
        Self { delay, micros }
    }

    pub fn free(self) -> (D, F) {
        (self.delay, self.micros)
    }
}

impl <D, F> core::fmt::Debug for MonotonicDelay<D, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "MonotonicDelay")
    }
}

impl <D: DelayNs, F: FnMut() -> u32> DelayNs for MonotonicDelay<D, F> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns)
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us)
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms)
    }
}

impl <D: DelayNs, F: FnMut() -> u32> Timing for MonotonicDelay<D, F> {
    fn elapsed_micros(&mut self) -> u32 {
        (self.micros)()
    }
}
