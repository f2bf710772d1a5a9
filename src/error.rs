//! Error types.
//!
//! Hardware operations are infallible on the board (every HAL error type is
//! `Infallible` there). These enums only carry the errors of the generic
//! `embedded-hal` collaborators so the library can be driven by fallible
//! implementations such as test doubles.

use crate::power::PowerState;

/// Failure while pushing a frame to the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "debug-mode", derive(defmt::Format))]
pub enum DisplayError<S, P> {
    /// Shifting the frame out failed; the latch was left low.
    Spi(S),
    /// Driving the strobe/latch line failed.
    Latch(P),
}

/// Failure in the power sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "debug-mode", derive(defmt::Format))]
pub enum PowerError<P> {
    /// A rail or key pin could not be driven or read.
    Pin(P),
    /// The operation is not allowed in the current state.
    OutOfOrder(PowerState),
}

/// Failure while emitting the diagnostic status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "debug-mode", derive(defmt::Format))]
pub enum StatusError<W> {
    Io(W),
    /// The line did not fit the formatting buffer.
    Format,
}

/// Failure in one foreground cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "debug-mode", derive(defmt::Format))]
pub enum CycleError<S, P, W> {
    Display(DisplayError<S, P>),
    Status(StatusError<W>),
}

impl<S, P, W> From<DisplayError<S, P>> for CycleError<S, P, W> {
    fn from(err: DisplayError<S, P>) -> Self {
        CycleError::Display(err)
    }
}

impl<S, P, W> From<StatusError<W>> for CycleError<S, P, W> {
    fn from(err: StatusError<W>) -> Self {
        CycleError::Status(err)
    }
}
