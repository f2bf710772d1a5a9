//! Power sequencing at boot.
//!
//! Pressing the power key connects the battery just long enough for the MCU
//! to start. The firmware must then take over by driving its own hold line
//! before the key is released, or the device loses power again.
//!
//! # Hardware Design
//!
//! - HOLD: keeps the main load switch closed once driven high
//! - KEY: the power key, readable as a plain input
//! - AUX_EN: switches the auxiliary rail feeding the indicator lighting
//!   (active-low on the board)
//!
//! # Boot Order
//!
//! ```text
//! Booting --begin_hold--> HoldingForRelease --key released--> Running
//! ```
//!
//! The auxiliary rail stays off until [`PowerSequencer::enable_auxiliary_rail`]
//! is called in `Running`, after the remaining peripherals are configured, so
//! its consumers never see an unsettled supply or undriven control lines.
//! `Running` is terminal; only a reset restarts the sequence.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::config::PowerConfig;
use crate::error::PowerError;

/// Position in the boot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "debug-mode", derive(defmt::Format))]
pub enum PowerState {
    /// Powered through the key only
    #[default]
    Booting,
    /// Hold line asserted, key may still be down
    HoldingForRelease,
    /// Key released, normal operation
    Running,
}

/// Drives the hold and auxiliary rails through the boot sequence.
pub struct PowerSequencer<H, K, A> {
    /// Hold line of the main load switch
    hold: H,
    /// Power key input
    key: K,
    /// Enable line of the auxiliary rail
    aux: A,
    config: PowerConfig,
    state: PowerState,
    aux_enabled: bool,
}

impl<H, K, A, E> PowerSequencer<H, K, A>
where
    H: OutputPin<Error = E>,
    K: InputPin<Error = E>,
    A: OutputPin<Error = E>,
{
    /// Creates a sequencer in `Booting` and drives the auxiliary rail off.
    ///
    /// # Arguments
    ///
    /// * `hold` - Hold line of the main load switch
    /// * `key` - Power key input
    /// * `aux` - Auxiliary rail enable line
    /// * `config` - Key and rail polarities, release poll interval
    pub fn new(hold: H, key: K, mut aux: A, config: PowerConfig) -> Result<Self, PowerError<E>> {
        aux.set_state(config.aux_enable.deasserted())
            .map_err(PowerError::Pin)?;

        Ok(Self {
            hold,
            key,
            aux,
            config,
            state: PowerState::Booting,
            aux_enabled: false,
        })
    }

    /// Asserts the hold line.
    ///
    /// Call this as early as possible after reset, before any user-visible
    /// feedback. Only the first call in `Booting` has an effect.
    pub fn begin_hold(&mut self) -> Result<(), PowerError<E>> {
        if self.state != PowerState::Booting {
            return Ok(());
        }
        self.hold.set_high().map_err(PowerError::Pin)?;
        self.transition(PowerState::HoldingForRelease);
        Ok(())
    }

    /// Polls the power key until it reads released.
    ///
    /// Blocks forever if the key is stuck down. No debouncing is done here:
    /// the bootloader's startup delay has already let the contacts settle.
    ///
    /// # Arguments
    ///
    /// * `delay` - Pause source between two reads of the key
    pub fn await_button_release<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), PowerError<E>> {
        match self.state {
            PowerState::Booting => return Err(PowerError::OutOfOrder(PowerState::Booting)),
            PowerState::Running => return Ok(()),
            PowerState::HoldingForRelease => {}
        }

        while self.key_pressed()? {
            delay.delay_us(self.config.release_poll_us);
        }

        self.transition(PowerState::Running);
        Ok(())
    }

    /// Switches the auxiliary rail on.
    ///
    /// Only valid in `Running`, once every peripheral controlling the rail's
    /// consumers has been configured.
    pub fn enable_auxiliary_rail(&mut self) -> Result<(), PowerError<E>> {
        if self.state != PowerState::Running {
            return Err(PowerError::OutOfOrder(self.state));
        }
        self.aux
            .set_state(self.config.aux_enable.asserted())
            .map_err(PowerError::Pin)?;
        self.aux_enabled = true;

        #[cfg(feature = "debug-mode")]
        defmt::info!("power: auxiliary rail enabled");

        Ok(())
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    pub fn is_aux_enabled(&self) -> bool {
        self.aux_enabled
    }

    fn key_pressed(&mut self) -> Result<bool, PowerError<E>> {
        let is_high = self.key.is_high().map_err(PowerError::Pin)?;
        Ok(self.config.key_pressed.is_asserted(is_high))
    }

    fn transition(&mut self, next: PowerState) {
        #[cfg(feature = "debug-mode")]
        defmt::info!("power: {} -> {}", self.state, next);

        self.state = next;
    }
}
