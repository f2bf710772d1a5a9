//! Ambient light sensor on ADC1.
//!
//! The embassy ADC driver only offers blocking or async reads, neither of which
//! can run inside the tick interrupt. This module drives ADC1 at register level
//! instead so a conversion can be started, polled and collected without ever
//! waiting on the hardware.
//!
//! # Configuration
//!
//! - Voltage regulator enabled and settled before calibration
//! - Asynchronous ADC clock (HSI16) divided by [`ADC_PRESCALER`]
//! - 8-bit resolution, right aligned
//! - Longest sample time (the sensor divider is high impedance)
//! - Single conversion per start

use embassy_stm32::Peri;
use embassy_stm32::pac;
use embassy_stm32::pac::adc::vals::{Ckmode, Presc, Res, SampleTime};
use embassy_stm32::peripherals::{ADC1, PA6};
use embassy_time::{Duration, block_for};

use dimclock_rs::Converter;
use dimclock_rs::config::{ADC_PRESCALER, ADC_REGULATOR_STARTUP_US};

/// ADC1 reading the light sense input.
pub struct LightSensor {
    _adc: Peri<'static, ADC1>,
    _pin: Peri<'static, PA6>,
}

impl LightSensor {
    /// Powers up, calibrates and enables ADC1.
    pub fn new(adc: Peri<'static, ADC1>, pin: Peri<'static, PA6>) -> Self {
        let regs = pac::ADC1;

        pac::RCC.apb2enr().modify(|w| w.set_adcen(true));

        regs.cfgr2().modify(|w| w.set_ckmode(Ckmode::ADCCLK));
        regs.ccr().modify(|w| w.set_presc(prescaler()));

        // Regulator must settle before calibration
        regs.cr().modify(|w| w.set_advregen(true));
        block_for(Duration::from_micros(ADC_REGULATOR_STARTUP_US.into()));

        // Calibrate while disabled
        regs.cr().modify(|w| w.set_adcal(true));
        while regs.cr().read().adcal() {}

        regs.cfgr1().modify(|w| {
            w.set_res(Res::BITS8);
            w.set_cont(false);
        });
        regs.smpr().modify(|w| w.set_smp(SampleTime::CYCLES160_5));

        regs.isr().write(|w| w.set_adrdy(true));
        regs.cr().modify(|w| w.set_aden(true));
        while !regs.isr().read().adrdy() {}

        Self {
            _adc: adc,
            _pin: pin,
        }
    }
}

fn prescaler() -> Presc {
    match ADC_PRESCALER {
        1 => Presc::DIV1,
        2 => Presc::DIV2,
        4 => Presc::DIV4,
        8 => Presc::DIV8,
        16 => Presc::DIV16,
        32 => Presc::DIV32,
        64 => Presc::DIV64,
        128 => Presc::DIV128,
        _ => Presc::DIV256,
    }
}

impl Converter for LightSensor {
    fn start(&mut self, channel: u8) {
        let regs = pac::ADC1;
        regs.chselr()
            .write_value(pac::adc::regs::Chselr(1 << u32::from(channel)));
        regs.isr().write(|w| w.set_eoc(true));
        regs.cr().modify(|w| w.set_adstart(true));
    }

    fn is_ready(&mut self) -> bool {
        pac::ADC1.isr().read().eoc()
    }

    fn read_8bit(&mut self) -> u8 {
        // Reading DR clears EOC
        pac::ADC1.dr().read().data() as u8
    }
}
