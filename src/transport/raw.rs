
/// Host side delays, in microseconds.
#[derive(Debug)]
pub struct HostDelay;

impl HostDelay {
    /// Both lines released before a host to device frame.
    pub const RELEASE: u32 = 300;
    /// Clock held low to inhibit the device.
    pub const INHIBIT: u32 = 300;
    /// Data held low before releasing clock.
    pub const START_BIT: u32 = 10;
    /// After the stop bit, before waiting for the line acknowledge.
    pub const ACKNOWLEDGE: u32 = 50;
    /// Both lines released before a device to host frame.
    pub const RECEIVE_RELEASE: u32 = 50;
    /// After the start bit clock edge.
    pub const START_BIT_EDGE: u32 = 5;
}

pub const DATA_BITS: usize = 8;
pub const FRAME_BITS: usize = 11;

const START_BIT: u16 = 1 << 0;
const DATA_SHIFT: u16 = 1;
const PARITY_BIT: u16 = 1 << 9;
const STOP_BIT: u16 = 1 << 10;

/// Odd parity bit for `data`. Data bits and parity bit together
/// always have an odd number of ones.
pub fn odd_parity(data: u8) -> bool {
    data.count_ones() % 2 == 0
}

/// One 11-bit PS/2 frame. Bit 0 is the first bit on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frame(u16);

impl Frame {
    /// Valid frame for `data`.
    pub fn new(data: u8) -> Self {
        let mut bits = (data as u16) << DATA_SHIFT | STOP_BIT;
        if odd_parity(data) {
            bits |= PARITY_BIT;
        }

        Frame(bits)
    }

    /// Frame from received data, parity and stop bits. Start bit is
    /// always zero.
    pub fn received(data: u8, parity: bool, stop: bool) -> Self {
        let mut bits = (data as u16) << DATA_SHIFT;
        if parity {
            bits |= PARITY_BIT;
        }
        if stop {
            bits |= STOP_BIT;
        }

        Frame(bits)
    }

    /// Bit `index` in wire order. Indexes past the stop bit read as 1.
    pub fn bit(&self, index: usize) -> bool {
        index >= FRAME_BITS || self.0 & (1 << index) != 0
    }

    pub fn data(&self) -> u8 {
        (self.0 >> DATA_SHIFT) as u8
    }

    pub fn start(&self) -> bool {
        self.0 & START_BIT != 0
    }

    pub fn parity(&self) -> bool {
        self.0 & PARITY_BIT != 0
    }

    pub fn stop(&self) -> bool {
        self.0 & STOP_BIT != 0
    }

    pub fn parity_ok(&self) -> bool {
        self.parity() == odd_parity(self.data())
    }
}
