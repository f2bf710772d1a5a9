//! TIM2 as brightness PWM carrier and tick source.
//!
//! TIM2 counts up to [`PWM_TOP`] and drives channel 2 (PA1) in PWM mode 1, so
//! the display output-enable duty is `CCR2 / 256`. Every counter overflow
//! raises the TIM2 update interrupt, which services the brightness controller
//! registered in [`BRIGHTNESS_TICK`]. The duty register is preloaded, so a new
//! value only takes effect at the next overflow and a period is never cut
//! short.

use core::convert::Infallible;

use embassy_stm32::Peri;
use embassy_stm32::pac;
use embassy_stm32::pac::gpio::vals::Moder;
use embassy_stm32::pac::timer::vals::Ocm;
use embassy_stm32::peripherals::{PA1, TIM2};
use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use pac::interrupt;

use dimclock_rs::config::{PWM_TOP, pwm_prescaler};
use dimclock_rs::{BrightnessController, TickSlot, TickTimer};

use crate::hardware::SYS_CLOCK_HZ;
use crate::light_sensor::LightSensor;

/// PA1 alternate function for TIM2_CH2
const TIM2_CH2_AF: u8 = 2;

/// PA1 pin index within GPIOA
const PWM_PIN: usize = 1;

/// Channel 2 register index (channels are zero-based in the PAC)
const PWM_CHANNEL: usize = 1;

/// Counter clock divider giving a carrier just under
/// [`PWM_CARRIER_HZ`](dimclock_rs::config::PWM_CARRIER_HZ)
/// (about 1.95 kHz from HSI16, 8192 cycles per tick).
const PWM_PRESCALER: u16 = pwm_prescaler(SYS_CLOCK_HZ);

/// Brightness controller running in the TIM2 update interrupt.
pub type LightController = BrightnessController<'static, LightSensor, DutyRegister>;

/// Registration point for the tick interrupt.
pub static BRIGHTNESS_TICK: TickSlot<LightController> = TickSlot::new();

/// Configures TIM2 and PA1 for PWM output and returns the duty and tick halves.
pub fn split(_tim: Peri<'static, TIM2>, _pin: Peri<'static, PA1>) -> (DutyRegister, OverflowTimer) {
    let tim = pac::TIM2;

    pac::RCC.apb1enr().modify(|w| w.set_tim2en(true));

    pac::GPIOA.afr(0).modify(|w| w.set_afr(PWM_PIN, TIM2_CH2_AF));
    pac::GPIOA.moder().modify(|w| w.set_moder(PWM_PIN, Moder::ALTERNATE));

    tim.psc().write_value(PWM_PRESCALER);
    tim.arr().write(|w| w.set_arr(PWM_TOP));
    tim.ccmr_output(0).modify(|w| {
        w.set_ocm(PWM_CHANNEL, Ocm::PWM_MODE1);
        w.set_ocpe(PWM_CHANNEL, true);
    });
    tim.ccer().modify(|w| w.set_cce(PWM_CHANNEL, true));
    tim.cr1().modify(|w| w.set_arpe(true));

    // Load PSC/ARR without raising an update interrupt
    tim.cr1().modify(|w| w.set_urs(pac::timer::vals::Urs::COUNTER_ONLY));
    tim.egr().write(|w| w.set_ug(true));

    (DutyRegister { _private: () }, OverflowTimer { running: false })
}

/// Capture/compare register of TIM2 channel 2.
pub struct DutyRegister {
    _private: (),
}

impl ErrorType for DutyRegister {
    type Error = Infallible;
}

impl SetDutyCycle for DutyRegister {
    fn max_duty_cycle(&self) -> u16 {
        PWM_TOP
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        pac::TIM2.ccr(PWM_CHANNEL).write(|w| w.set_ccr(duty));
        Ok(())
    }
}

/// TIM2 update (overflow) interrupt as a [`TickTimer`].
pub struct OverflowTimer {
    running: bool,
}

impl TickTimer for OverflowTimer {
    /// Starts the counter and unmasks the update interrupt.
    ///
    /// This is the point after which the tick context may preempt the caller.
    fn start(&mut self) {
        let tim = pac::TIM2;
        tim.sr().modify(|w| w.set_uif(false));
        tim.dier().modify(|w| w.set_uie(true));
        tim.cr1().modify(|w| w.set_cen(true));

        unsafe {
            cortex_m::peripheral::NVIC::unmask(embassy_stm32::interrupt::TIM2);
        }
        self.running = true;
    }

    /// Masks the update interrupt. The PWM output keeps running with the last
    /// duty value.
    fn stop(&mut self) {
        cortex_m::peripheral::NVIC::mask(embassy_stm32::interrupt::TIM2);
        pac::TIM2.dier().modify(|w| w.set_uie(false));
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// TIM2 update interrupt handler.
///
/// Clears the update flag and runs one brightness tick. Duty writes cannot
/// fail on this timer, so there is no error to surface.
#[interrupt]
fn TIM2() {
    pac::TIM2.sr().modify(|w| w.set_uif(false));

    if BRIGHTNESS_TICK.fire().is_none() {
        #[cfg(feature = "debug-mode")]
        defmt::warn!("tick before brightness controller was registered");
    }
}
