//! Firmware for a battery-powered two-digit LED display with ambient dimming.
//!
//! # Overview
//!
//! - Two shift-register digits refreshed through SPI and a storage latch
//! - Display PWM dimmed from an ambient light sensor, updated every PWM period
//! - Soft power switch: the power key powers the MCU, which then holds its own
//!   rail until the battery is disconnected
//! - Auxiliary rail for the indicator lighting, enabled last during boot
//! - Brightness status line on USART2 (115200 baud)
//!
//! # Hardware
//!
//! - **MCU**: STM32L031G6 (Cortex-M0+), HSI16 system clock
//! - **Display**: 2x shift register with storage latch, output enable on PWM
//! - **Light sensor**: resistive divider on ADC_IN6
//!
//! # Contexts
//!
//! The foreground is the embassy thread-mode executor running `main`. The
//! only preemptive context is the TIM2 update interrupt, which owns the
//! brightness controller. The two share a single byte, written only by the
//! interrupt.
//!
//! # Module Organization
//!
//! - [`hardware`] - Pin mappings and peripheral bring-up
//! - [`light_sensor`] - Non-blocking ADC1 access
//! - [`pwm_timer`] - TIM2 PWM carrier, duty register and tick interrupt
//!
//! On a host this binary is an empty `main`; the logic lives in the
//! `dimclock_rs` library and is tested there.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod hardware;
#[cfg(target_os = "none")]
mod light_sensor;
#[cfg(target_os = "none")]
mod pwm_timer;

#[cfg(target_os = "none")]
use {
    dimclock_rs::config::{FRAME_INTERVAL_MS, SpiSettings},
    dimclock_rs::{AnalogSampler, BrightnessCell, BrightnessController, Foreground, TickTimer},
    embassy_executor::Spawner,
    embassy_stm32::Config,
    embassy_time::{Delay, Timer},
    hardware::Peripherals,
    pwm_timer::BRIGHTNESS_TICK,
};
#[cfg(target_os = "none")]
use {defmt_rtt as _, panic_probe as _};

/// Display brightness, written by the TIM2 interrupt only.
#[cfg(target_os = "none")]
static BRIGHTNESS: BrightnessCell = BrightnessCell::new();

/// Creates the clock configuration: HSI16 straight to SYSCLK.
///
/// # Clock Settings
///
/// - **HSI16**: system clock, also the asynchronous ADC clock
/// - **MSI/HSE/PLL**: off
/// - **LSE**: off (the time driver runs from TIM21)
///
/// 16 MHz gives a 62.5 kHz 8-bit PWM carrier on TIM2 with no prescaler.
#[cfg(target_os = "none")]
fn create_clock_config() -> embassy_stm32::rcc::Config {
    embassy_stm32::rcc::Config {
        msi: None,
        hsi: true,
        hse: None,
        pll: None,
        sys: embassy_stm32::rcc::Sysclk::HSI,
        ahb_pre: embassy_stm32::rcc::AHBPrescaler::DIV1,
        apb1_pre: embassy_stm32::rcc::APBPrescaler::DIV1,
        apb2_pre: embassy_stm32::rcc::APBPrescaler::DIV1,
        ls: embassy_stm32::rcc::LsConfig::default(),
        voltage_scale: embassy_stm32::rcc::VoltageScale::RANGE1,
        mux: embassy_stm32::rcc::mux::ClockMux::default(),
    }
}

/// Main entry point.
///
/// # Boot Sequence
///
/// 1. Initialize clocks and split peripherals (aux rail driven off)
/// 2. Assert the hold line, before anything else is visible
/// 3. Wait for the power key to be released
/// 4. Bring up SPI, ADC and the PWM timer
/// 5. Load the initial duty and start the first conversion
/// 6. Enable the auxiliary rail
/// 7. Register the brightness controller and start the tick interrupt
///
/// # Main Loop
///
/// Push the next counter frame, wait [`FRAME_INTERVAL_MS`], report the
/// brightness on the status line. Forever.
#[cfg(target_os = "none")]
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let mut config = Config::default();
    config.rcc = create_clock_config();

    let p = embassy_stm32::init(config);

    let Peripherals {
        mut power,
        display,
        sensor,
        pwm,
        status,
    } = Peripherals::new(p);

    power.begin_hold().unwrap();

    #[cfg(feature = "debug-mode")]
    defmt::info!("Holding power, waiting for key release...");

    power.await_button_release(&mut Delay).unwrap();

    #[cfg(feature = "debug-mode")]
    defmt::info!("Bringing up display, sensor and PWM...");

    let (display, _output_enable) = display.into_driver(SpiSettings::DISPLAY);
    let sensor = sensor.into_sensor();
    let (duty, mut overflow) = pwm.into_timer();
    let status = status.into_reporter();

    let mut controller = BrightnessController::new(
        AnalogSampler::new(sensor),
        BRIGHTNESS.writer().unwrap(),
        duty,
    );
    controller.start().unwrap();

    power.enable_auxiliary_rail().unwrap();

    BRIGHTNESS_TICK.register(controller);
    overflow.start();

    #[cfg(feature = "debug-mode")]
    defmt::info!("Entering display refresh loop...");

    let mut foreground = Foreground::new(display, status, BRIGHTNESS.reader());
    loop {
        if foreground.refresh_next().is_err() {
            #[cfg(feature = "debug-mode")]
            defmt::warn!("Display refresh failed, keeping previous frame");
        }

        Timer::after_millis(FRAME_INTERVAL_MS.into()).await;

        if foreground.report().is_err() {
            #[cfg(feature = "debug-mode")]
            defmt::warn!("Status line write failed");
        }
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
