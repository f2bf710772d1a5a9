//! Shift-register display refresh.
//!
//! The display is a chain of two 8-bit shift registers behind a storage
//! latch. Bytes are clocked in over SPI while the latch (strobe) line is low;
//! the outputs only change on the rising edge of the strobe, so a frame that
//! is assembled serially still appears all at once.
//!
//! ```text
//! STR  ‾‾‾\____________________________/‾‾‾‾
//! MOSI      [ byte 0 ][ byte 1 ] (flush)
//! ```

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::error::DisplayError;

/// Two raw bytes, one per digit register, in shift order.
///
/// What the bytes look like on the segments is up to the wiring of the
/// display, not to this driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "debug-mode", derive(defmt::Format))]
pub struct DisplayFrame([u8; 2]);

impl DisplayFrame {
    pub const fn new(first: u8, second: u8) -> Self {
        Self([first, second])
    }

    /// Frame with the same byte in both registers.
    pub const fn splat(value: u8) -> Self {
        Self([value, value])
    }

    pub const fn bytes(&self) -> [u8; 2] {
        self.0
    }
}

/// Source of test frames `(n, n)`, with `n` counting up from zero
/// and wrapping at 0xFF.
#[derive(Debug, Clone, Default)]
pub struct FrameCounter {
    count: u8,
}

impl FrameCounter {
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Value the next frame will carry.
    pub const fn peek(&self) -> u8 {
        self.count
    }

    /// Returns the next frame and advances the counter.
    pub fn next_frame(&mut self) -> DisplayFrame {
        let frame = DisplayFrame::splat(self.count);
        self.count = self.count.wrapping_add(1);
        frame
    }
}

/// Pushes whole frames into the display shift registers.
pub struct DisplayDriver<S, L> {
    spi: S,
    strobe: L,
}

impl<S, L> DisplayDriver<S, L>
where
    S: SpiBus<u8>,
    L: OutputPin,
{
    /// Creates the driver. The SPI bus must already be configured with the
    /// display framing (see [`crate::config::SpiSettings::DISPLAY`]).
    pub fn new(spi: S, strobe: L) -> Self {
        Self { spi, strobe }
    }

    /// Presents `frame` as one atomic update.
    ///
    /// The strobe is only raised after the bus reports both bytes fully
    /// shifted. If shifting fails the strobe stays low and the previous
    /// frame remains visible.
    pub fn refresh(&mut self, frame: DisplayFrame) -> Result<(), DisplayError<S::Error, L::Error>> {
        self.strobe.set_low().map_err(DisplayError::Latch)?;

        self.spi.write(&frame.bytes()).map_err(DisplayError::Spi)?;
        self.spi.flush().map_err(DisplayError::Spi)?;

        self.strobe.set_high().map_err(DisplayError::Latch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_repeats_value_in_both_registers() {
        let mut frames = FrameCounter::new();
        assert_eq!(frames.next_frame(), DisplayFrame::new(0x00, 0x00));
        assert_eq!(frames.next_frame(), DisplayFrame::new(0x01, 0x01));
        assert_eq!(frames.peek(), 2);
    }

    #[test]
    fn peek_does_not_advance() {
        let mut frames = FrameCounter::new();
        frames.next_frame();
        assert_eq!(frames.peek(), 1);
        assert_eq!(frames.peek(), 1);
        assert_eq!(frames.next_frame(), DisplayFrame::splat(1));
    }

    #[test]
    fn counter_wraps_after_ff() {
        let mut frames = FrameCounter::new();
        for _ in 0..0xFF {
            frames.next_frame();
        }
        assert_eq!(frames.next_frame(), DisplayFrame::splat(0xFF));
        assert_eq!(frames.peek(), 0x00);
        assert_eq!(frames.next_frame(), DisplayFrame::splat(0x00));
    }

    #[test]
    fn frame_keeps_shift_order() {
        assert_eq!(DisplayFrame::new(0x12, 0x34).bytes(), [0x12, 0x34]);
    }
}
