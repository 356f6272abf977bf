//! Simulated PS/2 mouse for tests.
//!
//! The host side and the device share one bus. Every line read by the
//! host advances simulated time by one microsecond and delays advance it
//! by their length, so the device state machine sees the same timing as
//! real hardware polled in a tight loop.

use core::cell::RefCell;

use arraydeque::{ArrayDeque, Saturating};
use embedded_hal::delay::DelayNs;

use crate::device::raw::{FromMouse, ToMouse};
use crate::transport::io::{Line, LineIO, Timing};
use crate::transport::raw::{Frame, FRAME_BITS};

/// Lines released before the device starts a frame.
const SEND_GAP: u64 = 40;
/// Request to send seen before the device starts clocking.
const REQUEST_GAP: u64 = 10;
/// Data line set before the first falling clock edge.
const DATA_SETUP: u64 = 5;
const CLOCK_LOW: u64 = 40;
const CLOCK_HIGH: u64 = 35;

/// Frame received from the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HostFrame {
    pub data: u8,
    pub parity: bool,
    pub stop: bool,
}

#[derive(Debug, Copy, Clone)]
enum State {
    Idle,
    Sending { frame: Frame, bit: usize, clock_low: bool, until: u64 },
    Receiving { bits: u16, pulse: usize, clock_low: bool, until: u64 },
}

pub struct Device {
    now: u64,
    host_clock_low: bool,
    host_data_low: bool,
    device_clock_low: bool,
    device_data_low: bool,
    state: State,
    ready_since: Option<u64>,
    request_since: Option<u64>,
    connected: bool,
    echo: bool,
    outgoing: ArrayDeque<[u8; 32], Saturating>,
    frames: ArrayDeque<[HostFrame; 64], Saturating>,
    packets: ArrayDeque<[[u8; 3]; 8], Saturating>,
    awaiting_argument: Option<u8>,
    pub corrupt_parity: bool,
    pub bat: u8,
    pub id: u8,
    pub stream: bool,
    pub reporting: bool,
    pub scaling_2_1: bool,
    pub resolution: u8,
    pub sample_rate: u8,
}

impl Device {
    fn new() -> Self {
        Self {
            now: 0,
            host_clock_low: false,
            host_data_low: false,
            device_clock_low: false,
            device_data_low: false,
            state: State::Idle,
            ready_since: None,
            request_since: None,
            connected: true,
            echo: false,
            outgoing: ArrayDeque::new(),
            frames: ArrayDeque::new(),
            packets: ArrayDeque::new(),
            awaiting_argument: None,
            corrupt_parity: false,
            bat: FromMouse::BAT_COMPLETION_CODE,
            id: FromMouse::ID_STANDARD_MOUSE,
            stream: true,
            reporting: false,
            scaling_2_1: false,
            resolution: 2,
            sample_rate: 100,
        }
    }

    fn clock_level(&self) -> bool {
        !(self.host_clock_low || self.device_clock_low)
    }

    fn data_level(&self) -> bool {
        !(self.host_data_low || self.device_data_low)
    }

    fn advance(&mut self, micros: u64) {
        for _ in 0..micros {
            self.tick();
        }
    }

    fn tick(&mut self) {
        self.now += 1;

        if !self.connected || self.now < self.state_until() {
            return;
        }

        match self.state {
            State::Idle => self.idle(),
            State::Sending { frame, bit, clock_low, .. } => self.send_edge(frame, bit, clock_low),
            State::Receiving { bits, pulse, clock_low, .. } => self.receive_edge(bits, pulse, clock_low),
        }
    }

    fn state_until(&self) -> u64 {
        match self.state {
            State::Idle => 0,
            State::Sending { until, .. } | State::Receiving { until, .. } => until,
        }
    }

    fn idle(&mut self) {
        let clock_high = !self.host_clock_low;

        if clock_high && self.host_data_low {
            self.ready_since = None;
            let since = *self.request_since.get_or_insert(self.now);

            if self.now - since >= REQUEST_GAP {
                self.request_since = None;
                self.device_clock_low = true;
                self.state = State::Receiving { bits: 0, pulse: 1, clock_low: true, until: self.now + CLOCK_LOW };
            }
        } else if clock_high && !self.outgoing.is_empty() {
            self.request_since = None;
            let since = *self.ready_since.get_or_insert(self.now);

            if self.now - since >= SEND_GAP {
                self.ready_since = None;
                if let Some(byte) = self.outgoing.pop_front() {
                    let mut frame = Frame::new(byte);
                    if self.corrupt_parity {
                        frame = Frame::received(byte, !frame.parity(), true);
                    }

                    self.device_data_low = !frame.bit(0);
                    self.state = State::Sending { frame, bit: 0, clock_low: false, until: self.now + DATA_SETUP };
                }
            }
        } else {
            self.request_since = None;
            self.ready_since = None;
        }
    }

    fn send_edge(&mut self, frame: Frame, bit: usize, clock_low: bool) {
        if !clock_low {
            self.device_clock_low = true;
            self.state = State::Sending { frame, bit, clock_low: true, until: self.now + CLOCK_LOW };
            return;
        }

        self.device_clock_low = false;
        let bit = bit + 1;

        if bit == FRAME_BITS {
            self.device_data_low = false;
            self.state = State::Idle;
        } else {
            self.device_data_low = !frame.bit(bit);
            self.state = State::Sending { frame, bit, clock_low: false, until: self.now + CLOCK_HIGH };
        }
    }

    /// Host changes data while clock is low, device samples it on the
    /// rising edge. The eleventh pulse is the line acknowledge.
    fn receive_edge(&mut self, bits: u16, pulse: usize, clock_low: bool) {
        if clock_low {
            self.device_clock_low = false;

            if pulse == FRAME_BITS {
                self.device_data_low = false;
                self.state = State::Idle;
                self.host_frame(bits);
            } else {
                let mut bits = bits;
                if !self.host_data_low {
                    bits |= 1 << (pulse - 1);
                }
                self.state = State::Receiving { bits, pulse, clock_low: false, until: self.now + CLOCK_HIGH };
            }
        } else {
            let pulse = pulse + 1;
            self.device_clock_low = true;
            if pulse == FRAME_BITS {
                self.device_data_low = true;
            }
            self.state = State::Receiving { bits, pulse, clock_low: true, until: self.now + CLOCK_LOW };
        }
    }

    fn host_frame(&mut self, bits: u16) {
        let frame = HostFrame {
            data: bits as u8,
            parity: bits & (1 << 8) != 0,
            stop: bits & (1 << 9) != 0,
        };

        if self.frames.is_full() {
            self.frames.pop_front();
        }
        let _ = self.frames.push_back(frame);

        if self.echo {
            self.respond(frame.data);
        } else {
            self.command(frame.data);
        }
    }

    fn respond(&mut self, byte: u8) {
        let _ = self.outgoing.push_back(byte);
    }

    fn command(&mut self, data: u8) {
        if let Some(command) = self.awaiting_argument.take() {
            if command == ToMouse::SET_RESOLUTION {
                self.resolution = data;
            } else {
                self.sample_rate = data;
            }
            self.respond(FromMouse::ACK);
            return;
        }

        match data {
            ToMouse::RESET => {
                self.outgoing.clear();
                self.stream = true;
                self.reporting = false;
                self.scaling_2_1 = false;
                self.resolution = 2;
                self.sample_rate = 100;
                self.respond(FromMouse::ACK);
                self.respond(self.bat);
                self.respond(self.id);
                return;
            }
            ToMouse::SET_RESOLUTION | ToMouse::SET_SAMPLE_RATE => self.awaiting_argument = Some(data),
            ToMouse::ENABLE_DATA_REPORTING => self.reporting = true,
            ToMouse::DISABLE_DATA_REPORTING => self.reporting = false,
            ToMouse::SET_REMOTE_MODE => self.stream = false,
            ToMouse::SET_STREAM_MODE => self.stream = true,
            ToMouse::SET_SCALING_2_1 => self.scaling_2_1 = true,
            ToMouse::SET_SCALING_1_1 => self.scaling_2_1 = false,
            _ => (),
        }

        self.respond(FromMouse::ACK);

        match data {
            ToMouse::READ_DATA => {
                let packet = self.packets.pop_front().unwrap_or([0x08, 0, 0]);
                for byte in packet.iter().copied() {
                    self.respond(byte);
                }
            }
            ToMouse::GET_DEVICE_ID => self.respond(self.id),
            ToMouse::STATUS_REQUEST => {
                let mut status = 0;
                if !self.stream {
                    status |= 0b0100_0000;
                }
                if self.reporting {
                    status |= 0b0010_0000;
                }
                if self.scaling_2_1 {
                    status |= 0b0001_0000;
                }
                self.respond(status);
                self.respond(self.resolution);
                self.respond(self.sample_rate);
            }
            _ => (),
        }
    }
}

pub struct Bus(RefCell<Device>);

impl Bus {
    /// Standard mouse which passes its self test.
    pub fn new() -> Self {
        Bus(RefCell::new(Device::new()))
    }

    pub fn with_bat(bat: u8) -> Self {
        let bus = Self::new();
        bus.device(|device| device.bat = bat);
        bus
    }

    /// Device sends every received byte back instead of answering it.
    pub fn echo() -> Self {
        let bus = Self::new();
        bus.device(|device| device.echo = true);
        bus
    }

    /// Nothing drives the lines, they stay pulled high.
    pub fn disconnected() -> Self {
        let bus = Self::new();
        bus.device(|device| device.connected = false);
        bus
    }

    pub fn lines(&self) -> SimLines<'_> {
        SimLines(&self.0)
    }

    pub fn timing(&self) -> SimTiming<'_> {
        SimTiming(&self.0)
    }

    pub fn device<R, F: FnOnce(&mut Device) -> R>(&self, f: F) -> R {
        f(&mut self.0.borrow_mut())
    }

    pub fn now(&self) -> u64 {
        self.0.borrow().now
    }

    pub fn host_holds_clock(&self) -> bool {
        self.0.borrow().host_clock_low
    }

    pub fn last_frame(&self) -> Option<HostFrame> {
        self.0.borrow().frames.back().copied()
    }

    /// Data bytes of the frames received from the host, oldest first.
    pub fn sent(&self) -> Sent {
        let device = self.0.borrow();
        let mut sent = Sent { bytes: [0; 64], len: 0 };

        for frame in device.frames.iter() {
            sent.bytes[sent.len] = frame.data;
            sent.len += 1;
        }

        sent
    }

    pub fn clear_sent(&self) {
        self.0.borrow_mut().frames.clear();
    }

    /// Movement packet answered to the next Read Data command.
    pub fn push_packet(&self, packet: [u8; 3]) {
        let _ = self.0.borrow_mut().packets.push_back(packet);
    }

    /// Bytes the device sends on its own, like a stream mode packet.
    pub fn push_bytes(&self, bytes: &[u8]) {
        let mut device = self.0.borrow_mut();
        for byte in bytes {
            let _ = device.outgoing.push_back(*byte);
        }
    }
}

pub struct Sent {
    bytes: [u8; 64],
    len: usize,
}

impl Sent {
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

pub struct SimLines<'a>(&'a RefCell<Device>);

impl LineIO for SimLines<'_> {
    type PinId = Line;

    fn drive_low(&mut self, pin: Line) {
        let mut device = self.0.borrow_mut();
        match pin {
            Line::Clock => device.host_clock_low = true,
            Line::Data => device.host_data_low = true,
        }
    }

    fn release(&mut self, pin: Line) {
        let mut device = self.0.borrow_mut();
        match pin {
            Line::Clock => device.host_clock_low = false,
            Line::Data => device.host_data_low = false,
        }
    }

    fn read_level(&mut self, pin: Line) -> bool {
        let mut device = self.0.borrow_mut();
        device.advance(1);
        match pin {
            Line::Clock => device.clock_level(),
            Line::Data => device.data_level(),
        }
    }
}

pub struct SimTiming<'a>(&'a RefCell<Device>);

impl DelayNs for SimTiming<'_> {
    fn delay_ns(&mut self, ns: u32) {
        let micros = ns / 1000 + (ns % 1000 != 0) as u32;
        self.0.borrow_mut().advance(micros as u64);
    }

    fn delay_us(&mut self, us: u32) {
        self.0.borrow_mut().advance(us as u64);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().advance(ms as u64 * 1000);
    }
}

impl Timing for SimTiming<'_> {
    fn elapsed_micros(&mut self) -> u32 {
        self.0.borrow().now as u32
    }
}
