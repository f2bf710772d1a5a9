//! Compile-time configuration.
//!
//! The firmware has no runtime configuration surface: pin polarities, SPI
//! framing, channel numbers and timing all live here as constants.

use embedded_hal::digital::PinState;
use embedded_hal::spi::{Mode, Phase, Polarity};

/// ADC channel wired to the ambient light sensor.
pub const LIGHT_ADC_CHANNEL: u8 = 6;

/// Brightness before the first conversion completes (full duty).
pub const INITIAL_BRIGHTNESS: u8 = u8::MAX;

/// Counter top of the PWM carrier. The duty register uses the full 8-bit range.
pub const PWM_TOP: u16 = 255;

/// Target frequency of the PWM carrier, which is also the brightness tick rate.
pub const PWM_CARRIER_HZ: u32 = 2_000;

/// Delay between two display refresh cycles in milliseconds.
///
/// This also paces the diagnostic status line, which is emitted once per cycle.
pub const FRAME_INTERVAL_MS: u32 = 100;

/// ADC clock divider applied to the peripheral clock.
pub const ADC_PRESCALER: u16 = 128;

/// ADC voltage regulator start-up time before calibration may begin.
pub const ADC_REGULATOR_STARTUP_US: u32 = 20;

/// Baud rate of the diagnostic UART.
pub const STATUS_BAUD: u32 = 115_200;

/// Timer prescaler register value that brings a `PWM_TOP`-count carrier
/// closest to [`PWM_CARRIER_HZ`] without exceeding it.
pub const fn pwm_prescaler(sys_clock_hz: u32) -> u16 {
    let period = (PWM_TOP as u32 + 1) * PWM_CARRIER_HZ;
    let divider = sys_clock_hz.div_ceil(period);
    if divider == 0 {
        0
    } else if divider > u16::MAX as u32 + 1 {
        u16::MAX
    } else {
        (divider - 1) as u16
    }
}

/// Electrical level at which a signal counts as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "debug-mode", derive(defmt::Format))]
pub enum ActiveLevel {
    /// Asserted when the line is high
    High,
    /// Asserted when the line is low
    Low,
}

impl ActiveLevel {
    /// Returns whether a line currently reading `is_high` is asserted.
    pub const fn is_asserted(self, is_high: bool) -> bool {
        match self {
            ActiveLevel::High => is_high,
            ActiveLevel::Low => !is_high,
        }
    }

    /// Line state that asserts the signal.
    pub const fn asserted(self) -> PinState {
        match self {
            ActiveLevel::High => PinState::High,
            ActiveLevel::Low => PinState::Low,
        }
    }

    /// Line state that releases the signal.
    pub const fn deasserted(self) -> PinState {
        match self {
            ActiveLevel::High => PinState::Low,
            ActiveLevel::Low => PinState::High,
        }
    }
}

/// Order in which bits of a byte leave the shift register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "debug-mode", derive(defmt::Format))]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// SPI framing used to clock bytes into the display shift registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiSettings {
    pub bit_order: BitOrder,
    pub mode: Mode,
    /// Divider applied to the system clock to derive SCK.
    pub clock_divisor: u32,
}

impl SpiSettings {
    /// Framing of the display chain: LSB first, clock idles high, data
    /// captured on the first edge, SCK at half the system clock.
    ///
    /// Polarity and phase work on the prototype but are not confirmed against
    /// the shift-register datasheet timing.
    pub const DISPLAY: Self = Self {
        bit_order: BitOrder::LsbFirst,
        mode: Mode {
            polarity: Polarity::IdleHigh,
            phase: Phase::CaptureOnFirstTransition,
        },
        clock_divisor: 2,
    };

    /// SCK frequency for a given system clock.
    pub const fn frequency_hz(&self, sys_clock_hz: u32) -> u32 {
        sys_clock_hz / self.clock_divisor
    }
}

/// Pin polarities and timing of the power sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "debug-mode", derive(defmt::Format))]
pub struct PowerConfig {
    /// Level the power key reads while it is held down.
    pub key_pressed: ActiveLevel,
    /// Level that switches the auxiliary rail on.
    pub aux_enable: ActiveLevel,
    /// Pause between two reads of the power key while waiting for release.
    pub release_poll_us: u32,
}

impl PowerConfig {
    pub const DEFAULT: Self = Self {
        key_pressed: ActiveLevel::High,
        aux_enable: ActiveLevel::Low,
        release_poll_us: 1_000,
    };
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
