//! Free-running analog sampling of a single channel.
//!
//! The sampler is driven from the tick interrupt, so nothing here may block:
//! readiness is polled and an unfinished conversion simply means "try again
//! next tick".

/// ADC collaborator exposing one conversion at a time.
pub trait Converter {
    /// Begins a conversion on `channel`.
    fn start(&mut self, channel: u8);

    /// Returns true once the running conversion has finished. Never blocks.
    fn is_ready(&mut self) -> bool;

    /// Reads the finished conversion, reduced to 8 bits.
    fn read_8bit(&mut self) -> u8;
}

impl<T: Converter + ?Sized> Converter for &mut T {
    fn start(&mut self, channel: u8) {
        T::start(self, channel)
    }

    fn is_ready(&mut self) -> bool {
        T::is_ready(self)
    }

    fn read_8bit(&mut self) -> u8 {
        T::read_8bit(self)
    }
}

/// Sampling state of the channel.
///
/// ```text
/// Idle --start--> InFlight --hardware done--> Ready --read--> Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "debug-mode", derive(defmt::Format))]
pub enum ConversionState {
    #[default]
    Idle,
    InFlight,
    Ready,
}

/// Tracks the one in-flight conversion of a [`Converter`].
pub struct AnalogSampler<A> {
    adc: A,
    state: ConversionState,
}

impl<A: Converter> AnalogSampler<A> {
    pub fn new(adc: A) -> Self {
        Self {
            adc,
            state: ConversionState::Idle,
        }
    }

    /// Starts a conversion on `channel`.
    ///
    /// Ignored while a conversion is in flight. An unread result is discarded.
    pub fn start(&mut self, channel: u8) {
        if self.state == ConversionState::InFlight {
            return;
        }
        self.adc.start(channel);
        self.state = ConversionState::InFlight;
    }

    /// Returns true exactly when a result is ready to be read.
    pub fn poll(&mut self) -> bool {
        if self.state == ConversionState::InFlight && self.adc.is_ready() {
            self.state = ConversionState::Ready;
        }
        self.state == ConversionState::Ready
    }

    /// Consumes the ready result, returning the sampler to `Idle`.
    ///
    /// Returns `None` unless [`poll`](Self::poll) has reported a result.
    pub fn read(&mut self) -> Option<u8> {
        if self.state != ConversionState::Ready {
            return None;
        }
        self.state = ConversionState::Idle;
        Some(self.adc.read_8bit())
    }

    pub fn state(&self) -> ConversionState {
        self.state
    }

    /// Returns the wrapped converter.
    pub fn release(self) -> A {
        self.adc
    }
}
