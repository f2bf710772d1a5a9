//! Ambient-light-adaptive display brightness.
//!
//! # Ownership
//!
//! The brightness byte lives in a [`BrightnessCell`]. Exactly one
//! [`BrightnessWriter`] can be taken from a cell and it is moved into the
//! [`BrightnessController`], which runs in the tick context. Every other
//! context gets a [`BrightnessReader`] and can only observe the value.
//!
//! A byte load or store is indivisible on the target, so readers never see a
//! torn value. The computation from a sample to a duty value happens entirely
//! inside [`BrightnessController::tick`], so the cell only ever holds a
//! finished result.

use embedded_hal::pwm::SetDutyCycle;
use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use crate::config::{INITIAL_BRIGHTNESS, LIGHT_ADC_CHANNEL};
use crate::sampler::{AnalogSampler, Converter};
use crate::tick::TickHandler;

/// Duty value for a light sample: the literal complement `255 - sample`.
///
/// Sensor polarity has not been verified on hardware, so this keeps the
/// computation as-is rather than assuming which direction is "brighter".
pub const fn duty_for_sample(sample: u8) -> u8 {
    u8::MAX - sample
}

/// Single-writer, multi-reader brightness byte.
///
/// The value is PWM ON time out of 255; higher is brighter.
pub struct BrightnessCell {
    value: AtomicU8,
    writer_taken: AtomicBool,
}

impl BrightnessCell {
    /// Creates a cell at full brightness.
    pub const fn new() -> Self {
        Self {
            value: AtomicU8::new(INITIAL_BRIGHTNESS),
            writer_taken: AtomicBool::new(false),
        }
    }

    /// Hands out the write capability. Only the first call succeeds.
    pub fn writer(&self) -> Option<BrightnessWriter<'_>> {
        if self.writer_taken.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(BrightnessWriter { value: &self.value })
    }

    pub fn reader(&self) -> BrightnessReader<'_> {
        BrightnessReader { value: &self.value }
    }
}

impl Default for BrightnessCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive write capability for a [`BrightnessCell`].
pub struct BrightnessWriter<'a> {
    value: &'a AtomicU8,
}

impl<'a> BrightnessWriter<'a> {
    pub fn set(&mut self, value: u8) {
        self.value.store(value, Ordering::Release);
    }

    pub fn get(&self) -> u8 {
        self.value.load(Ordering::Acquire)
    }

    pub fn reader(&self) -> BrightnessReader<'a> {
        BrightnessReader { value: self.value }
    }
}

/// Read-only view of a [`BrightnessCell`].
#[derive(Clone, Copy)]
pub struct BrightnessReader<'a> {
    value: &'a AtomicU8,
}

impl BrightnessReader<'_> {
    pub fn get(&self) -> u8 {
        self.value.load(Ordering::Acquire)
    }
}

/// Couples background light sampling with the PWM duty register.
///
/// Call [`tick`](Self::tick) once per timer period, from the tick context only.
pub struct BrightnessController<'a, A, P> {
    sampler: AnalogSampler<A>,
    level: BrightnessWriter<'a>,
    pwm: P,
    channel: u8,
}

impl<'a, A: Converter, P: SetDutyCycle> BrightnessController<'a, A, P> {
    /// Creates a controller sampling [`LIGHT_ADC_CHANNEL`].
    pub fn new(sampler: AnalogSampler<A>, level: BrightnessWriter<'a>, pwm: P) -> Self {
        Self::with_channel(sampler, level, pwm, LIGHT_ADC_CHANNEL)
    }

    pub fn with_channel(
        sampler: AnalogSampler<A>,
        level: BrightnessWriter<'a>,
        pwm: P,
        channel: u8,
    ) -> Self {
        Self {
            sampler,
            level,
            pwm,
            channel,
        }
    }

    /// Loads the current brightness into the duty register and kicks off the
    /// first conversion. Call once before the tick timer is started.
    pub fn start(&mut self) -> Result<(), P::Error> {
        self.write_duty()?;
        self.sampler.start(self.channel);
        Ok(())
    }

    /// One timer period.
    ///
    /// 1. If a conversion finished, store its complement and immediately start
    ///    the next one on the same channel.
    /// 2. Write the brightness into the duty register, changed or not.
    pub fn tick(&mut self) -> Result<(), P::Error> {
        if self.sampler.poll() {
            if let Some(sample) = self.sampler.read() {
                self.level.set(duty_for_sample(sample));
            }
            self.sampler.start(self.channel);
        }
        self.write_duty()
    }

    /// Current brightness.
    pub fn level(&self) -> u8 {
        self.level.get()
    }

    pub fn reader(&self) -> BrightnessReader<'a> {
        self.level.reader()
    }

    pub fn sampler(&self) -> &AnalogSampler<A> {
        &self.sampler
    }

    fn write_duty(&mut self) -> Result<(), P::Error> {
        self.pwm
            .set_duty_cycle_fraction(u16::from(self.level.get()), u16::from(u8::MAX))
    }
}

impl<A: Converter, P: SetDutyCycle> TickHandler for BrightnessController<'_, A, P> {
    type Error = P::Error;

    fn on_tick(&mut self) -> Result<(), Self::Error> {
        self.tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duty_is_the_complement_of_the_sample() {
        assert_eq!(duty_for_sample(0), 255);
        assert_eq!(duty_for_sample(255), 0);
        assert_eq!(duty_for_sample(100), 155);
    }

    #[test]
    fn cell_starts_at_full_brightness() {
        let cell = BrightnessCell::new();
        assert_eq!(cell.reader().get(), INITIAL_BRIGHTNESS);
    }

    #[test]
    fn only_one_writer_per_cell() {
        let cell = BrightnessCell::new();
        let mut writer = cell.writer().expect("first writer");
        assert!(cell.writer().is_none());

        let reader = cell.reader();
        writer.set(17);
        assert_eq!(reader.get(), 17);
        assert_eq!(writer.reader().get(), 17);
    }
}
