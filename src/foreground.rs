//! Body of the unbounded main loop.
//!
//! Once the power sequence has finished, the foreground does nothing but push
//! the next frame, wait [`FRAME_INTERVAL_MS`] and report the brightness. It
//! only ever reads the brightness; the tick context owns it.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use embedded_io::Write;

use crate::brightness::BrightnessReader;
use crate::config::FRAME_INTERVAL_MS;
use crate::display::{DisplayDriver, DisplayFrame, FrameCounter};
use crate::error::{CycleError, DisplayError, StatusError};
use crate::status::StatusReporter;

pub struct Foreground<'a, S, L, W> {
    display: DisplayDriver<S, L>,
    frames: FrameCounter,
    status: StatusReporter<W>,
    brightness: BrightnessReader<'a>,
}

impl<'a, S, L, W> Foreground<'a, S, L, W>
where
    S: SpiBus<u8>,
    L: OutputPin,
    W: Write,
{
    pub fn new(
        display: DisplayDriver<S, L>,
        status: StatusReporter<W>,
        brightness: BrightnessReader<'a>,
    ) -> Self {
        Self {
            display,
            frames: FrameCounter::new(),
            status,
            brightness,
        }
    }

    /// Pushes the next counter frame and returns it.
    pub fn refresh_next(&mut self) -> Result<DisplayFrame, DisplayError<S::Error, L::Error>> {
        let frame = self.frames.next_frame();
        self.display.refresh(frame)?;
        Ok(frame)
    }

    /// Writes the current brightness to the status line.
    pub fn report(&mut self) -> Result<(), StatusError<W::Error>> {
        self.status.report(self.brightness.get())
    }

    /// One full cycle with a blocking delay: refresh, wait, report.
    pub fn cycle<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<DisplayFrame, CycleError<S::Error, L::Error, W::Error>> {
        let frame = self.refresh_next()?;
        delay.delay_ms(FRAME_INTERVAL_MS);
        self.report()?;
        Ok(frame)
    }
}
