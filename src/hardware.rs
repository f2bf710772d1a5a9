//! Pin mappings and peripheral bring-up.
//!
//! Peripherals are claimed in two steps. [`Peripherals::new`] only creates the
//! power pins and the always-safe static levels; everything else is kept as
//! unconfigured peripheral handles until the power key has been released and
//! the caller brings each subsystem up in order.
//!
//! # Pin Assignments
//!
//! ## Power Control
//! - **PB1**: PWR_HOLD - Keeps the main load switch closed (active-high)
//! - **PA8**: PWR_KEY - Power key sense, high while pressed
//! - **PB0**: AUX_PWR_N - Active-low enable for the auxiliary rail
//!
//! ## Display (2x shift register behind a storage latch)
//! - **PA5**: DISP_CP - SPI1_SCK
//! - **PA7**: DISP_D - SPI1_MOSI
//! - **PA4**: DISP_STR - Storage latch strobe
//! - **PA15**: DISP_OE - Active-low output enable, held enabled
//! - **PA1**: DISP_PWM - TIM2_CH2 brightness PWM
//!
//! ## Sensing & Diagnostics
//! - **PA6**: LIGHT_SENSE - ADC_IN6
//! - **PA2**: STATUS_TX - USART2_TX
//!
//! ## Debug (SWD)
//! - **PA13**: SWDIO
//! - **PA14**: SWCLK

use embassy_stm32::Peri;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::peripherals::{ADC1, PA1, PA2, PA5, PA6, PA7, SPI1, TIM2, USART2};
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::{self, UartTx};

use dimclock_rs::config::{BitOrder, PowerConfig, STATUS_BAUD, SpiSettings};
use dimclock_rs::{DisplayDriver, PowerSequencer, StatusReporter};
use embedded_hal::spi::{Phase, Polarity};

use crate::light_sensor::LightSensor;
use crate::pwm_timer::{self, DutyRegister, OverflowTimer};

/// System clock after `embassy_stm32::init` (HSI16, no PLL).
pub const SYS_CLOCK_HZ: u32 = 16_000_000;

pub type PowerControl = PowerSequencer<Output<'static>, Input<'static>, Output<'static>>;

/// Top-level peripheral container.
pub struct Peripherals {
    /// Power-rail sequencer, ready for `begin_hold`
    pub power: PowerControl,
    pub display: DisplayPeripherals,
    pub sensor: SensorPeripherals,
    pub pwm: PwmPeripherals,
    pub status: StatusPeripherals,
}

impl Peripherals {
    /// Splits the STM32 peripheral singleton.
    ///
    /// # Initial GPIO States
    ///
    /// - PB1 (PWR_HOLD): Low, raised by `begin_hold`
    /// - PB0 (AUX_PWR_N): High (auxiliary rail OFF)
    /// - PA4 (DISP_STR): High (latch idle)
    /// - PA15 (DISP_OE): Low (outputs enabled)
    pub fn new(p: embassy_stm32::Peripherals) -> Self {
        let power = PowerSequencer::new(
            Output::new(p.PB1, Level::Low, Speed::Low),
            Input::new(p.PA8, Pull::Down),
            Output::new(p.PB0, Level::High, Speed::Low),
            PowerConfig::DEFAULT,
        )
        .unwrap();

        Self {
            power,
            display: DisplayPeripherals {
                spi: p.SPI1,
                sck: p.PA5,
                mosi: p.PA7,
                strobe: Output::new(p.PA4, Level::High, Speed::VeryHigh),
                output_enable: Output::new(p.PA15, Level::Low, Speed::Low),
            },
            sensor: SensorPeripherals {
                adc: p.ADC1,
                pin: p.PA6,
            },
            pwm: PwmPeripherals {
                tim: p.TIM2,
                pin: p.PA1,
            },
            status: StatusPeripherals {
                usart: p.USART2,
                tx: p.PA2,
            },
        }
    }
}

pub struct DisplayPeripherals {
    spi: Peri<'static, SPI1>,
    sck: Peri<'static, PA5>,
    mosi: Peri<'static, PA7>,
    strobe: Output<'static>,
    output_enable: Output<'static>,
}

impl DisplayPeripherals {
    /// Configures SPI1 with `settings` and builds the display driver.
    ///
    /// The returned output-enable pin must be kept alive; dropping it releases
    /// the line and blanks the display.
    pub fn into_driver(
        self,
        settings: SpiSettings,
    ) -> (
        DisplayDriver<impl embedded_hal::spi::SpiBus<u8>, Output<'static>>,
        Output<'static>,
    ) {
        let bus = Spi::new_blocking_txonly(self.spi, self.sck, self.mosi, spi_config(settings));
        (DisplayDriver::new(bus, self.strobe), self.output_enable)
    }
}

fn spi_config(settings: SpiSettings) -> spi::Config {
    let mut config = spi::Config::default();
    config.mode = spi::Mode {
        polarity: match settings.mode.polarity {
            Polarity::IdleLow => spi::Polarity::IdleLow,
            Polarity::IdleHigh => spi::Polarity::IdleHigh,
        },
        phase: match settings.mode.phase {
            Phase::CaptureOnFirstTransition => spi::Phase::CaptureOnFirstTransition,
            Phase::CaptureOnSecondTransition => spi::Phase::CaptureOnSecondTransition,
        },
    };
    config.bit_order = match settings.bit_order {
        BitOrder::MsbFirst => spi::BitOrder::MsbFirst,
        BitOrder::LsbFirst => spi::BitOrder::LsbFirst,
    };
    config.frequency = Hertz(settings.frequency_hz(SYS_CLOCK_HZ));
    config
}

pub struct SensorPeripherals {
    adc: Peri<'static, ADC1>,
    pin: Peri<'static, PA6>,
}

impl SensorPeripherals {
    pub fn into_sensor(self) -> LightSensor {
        LightSensor::new(self.adc, self.pin)
    }
}

pub struct PwmPeripherals {
    tim: Peri<'static, TIM2>,
    pin: Peri<'static, PA1>,
}

impl PwmPeripherals {
    /// Configures TIM2 as the PWM carrier. The counter stays stopped until
    /// the overflow timer is started.
    pub fn into_timer(self) -> (DutyRegister, OverflowTimer) {
        pwm_timer::split(self.tim, self.pin)
    }
}

pub struct StatusPeripherals {
    usart: Peri<'static, USART2>,
    tx: Peri<'static, PA2>,
}

impl StatusPeripherals {
    pub fn into_reporter(self) -> StatusReporter<impl embedded_io::Write> {
        let mut config = usart::Config::default();
        config.baudrate = STATUS_BAUD;
        let tx = UartTx::new_blocking(self.usart, self.tx, config).unwrap();
        StatusReporter::new(tx)
    }
}
