//! Shared test infrastructure for dimclock-rs integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use dimclock_rs::Converter;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, InputPin, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};
use embedded_hal::spi::{self, SpiBus};

// ============================================================================
// Event Log
// ============================================================================

/// Everything the mocks below observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Pin(&'static str, bool),
    Shift(u8),
    Flush,
    AdcStart(u8),
    Duty(u16),
    DelayNs(u32),
    Uart(Vec<u8>),
}

#[derive(Clone, Default)]
pub struct Log(Rc<RefCell<Vec<Event>>>);

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Bytes shifted out since the log was last cleared.
    pub fn shifted(&self) -> Vec<u8> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Shift(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    pub fn uart_text(&self) -> String {
        let bytes: Vec<u8> = self
            .0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Uart(b) => Some(b.clone()),
                _ => None,
            })
            .flatten()
            .collect();
        String::from_utf8(bytes).unwrap()
    }
}

// ============================================================================
// GPIO
// ============================================================================

/// Output pin that records every level it is driven to.
pub struct RecordingPin {
    name: &'static str,
    level: Rc<Cell<bool>>,
    log: Log,
}

impl RecordingPin {
    pub fn new(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            level: Rc::new(Cell::new(false)),
            log: log.clone(),
        }
    }

    /// Shared handle to the current level.
    pub fn level(&self) -> Rc<Cell<bool>> {
        self.level.clone()
    }
}

impl digital::ErrorType for RecordingPin {
    type Error = Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.level.set(false);
        self.log.push(Event::Pin(self.name, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.level.set(true);
        self.log.push(Event::Pin(self.name, true));
        Ok(())
    }
}

/// Input pin playing back scripted levels; the last level repeats forever.
pub struct ScriptedInput {
    levels: VecDeque<bool>,
    last: bool,
    reads: Rc<Cell<u32>>,
}

impl ScriptedInput {
    pub fn new(levels: &[bool]) -> Self {
        Self {
            levels: levels.iter().copied().collect(),
            last: levels.last().copied().unwrap_or(false),
            reads: Rc::new(Cell::new(0)),
        }
    }

    pub fn reads(&self) -> Rc<Cell<u32>> {
        self.reads.clone()
    }

    fn next_level(&mut self) -> bool {
        self.reads.set(self.reads.get() + 1);
        self.levels.pop_front().unwrap_or(self.last)
    }
}

impl digital::ErrorType for ScriptedInput {
    type Error = Infallible;
}

impl InputPin for ScriptedInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.next_level())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.next_level())
    }
}

// ============================================================================
// SPI
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockSpiError;

impl spi::Error for MockSpiError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

/// SPI bus recording each shifted byte. Optionally fails after a number of
/// bytes to simulate an aborted transfer.
pub struct RecordingSpi {
    log: Log,
    fail_after: Option<usize>,
    shifted: usize,
}

impl RecordingSpi {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            fail_after: None,
            shifted: 0,
        }
    }

    pub fn failing_after(log: &Log, bytes: usize) -> Self {
        Self {
            fail_after: Some(bytes),
            ..Self::new(log)
        }
    }
}

impl spi::ErrorType for RecordingSpi {
    type Error = MockSpiError;
}

impl SpiBus<u8> for RecordingSpi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), MockSpiError> {
        words.fill(0);
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), MockSpiError> {
        for &word in words {
            if self.fail_after.is_some_and(|limit| self.shifted >= limit) {
                return Err(MockSpiError);
            }
            self.shifted += 1;
            self.log.push(Event::Shift(word));
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), MockSpiError> {
        self.write(write)?;
        read.fill(0);
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), MockSpiError> {
        let copy = words.to_vec();
        self.write(&copy)?;
        words.fill(0);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), MockSpiError> {
        self.log.push(Event::Flush);
        Ok(())
    }
}

// ============================================================================
// ADC
// ============================================================================

/// Converter playing back scripted samples.
///
/// Each conversion becomes ready after `latency` polls and yields the next
/// sample in the script (the last one repeats).
pub struct ScriptedAdc {
    samples: VecDeque<u8>,
    last: u8,
    latency: u32,
    remaining: u32,
    log: Log,
}

impl ScriptedAdc {
    pub fn new(log: &Log, latency: u32, samples: &[u8]) -> Self {
        Self {
            samples: samples.iter().copied().collect(),
            last: samples.last().copied().unwrap_or(0),
            latency,
            remaining: 0,
            log: log.clone(),
        }
    }
}

impl Converter for ScriptedAdc {
    fn start(&mut self, channel: u8) {
        self.remaining = self.latency;
        self.log.push(Event::AdcStart(channel));
    }

    fn is_ready(&mut self) -> bool {
        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        false
    }

    fn read_8bit(&mut self) -> u8 {
        match self.samples.pop_front() {
            Some(sample) => {
                self.last = sample;
                sample
            }
            None => self.last,
        }
    }
}

// ============================================================================
// PWM
// ============================================================================

/// PWM channel remembering its duty register.
pub struct MockPwm {
    max: u16,
    duty: Rc<Cell<u16>>,
    log: Log,
}

impl MockPwm {
    pub fn new(log: &Log) -> Self {
        Self::with_max(log, 255)
    }

    pub fn with_max(log: &Log, max: u16) -> Self {
        Self {
            max,
            duty: Rc::new(Cell::new(0)),
            log: log.clone(),
        }
    }

    pub fn duty(&self) -> Rc<Cell<u16>> {
        self.duty.clone()
    }
}

impl pwm::ErrorType for MockPwm {
    type Error = Infallible;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.duty.set(duty);
        self.log.push(Event::Duty(duty));
        Ok(())
    }
}

// ============================================================================
// Delay & UART
// ============================================================================

/// Delay that returns immediately and records the requested time.
pub struct RecordingDelay {
    log: Log,
}

impl RecordingDelay {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.push(Event::DelayNs(ns));
    }
}

/// UART transmitter recording each write.
pub struct RecordingUart {
    log: Log,
}

impl RecordingUart {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl embedded_io::ErrorType for RecordingUart {
    type Error = Infallible;
}

impl embedded_io::Write for RecordingUart {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
        self.log.push(Event::Uart(buf.to_vec()));
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}
