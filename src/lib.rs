//! Core logic for a battery-powered segment display with ambient auto-dimming.
//!
//! # Overview
//!
//! The device shows two shift-register digits, holds its own power rail once
//! the power key has been pressed, and dims the display PWM according to an
//! ambient light sensor. Everything in this library is generic over
//! `embedded-hal` traits so it runs unchanged on the board and on a host.
//!
//! # Contexts
//!
//! - **Tick context** (timer overflow interrupt): [`brightness::BrightnessController`]
//!   consumes finished light conversions and rewrites the PWM duty register.
//! - **Foreground** (main loop): [`foreground::Foreground`] pushes one
//!   [`display::DisplayFrame`] per cycle and reports the current brightness.
//!
//! The only shared value is the brightness byte in [`brightness::BrightnessCell`]:
//! the tick context is its sole writer, every other context reads it.
//!
//! # Module Organization
//!
//! - [`config`] - Compile-time constants and small configuration types
//! - [`error`] - Error types per collaborator
//! - [`sampler`] - Free-running analog sampling
//! - [`brightness`] - Shared brightness cell and the tick-driven controller
//! - [`tick`] - Periodic timer abstraction and handler registration
//! - [`display`] - Latched two-byte display refresh
//! - [`power`] - Power-rail sequencing at boot
//! - [`status`] - Diagnostic status line
//! - [`foreground`] - Body of the unbounded main loop

#![no_std]

#[cfg(test)]
extern crate std;

pub mod brightness;
pub mod config;
pub mod display;
pub mod error;
pub mod foreground;
pub mod power;
pub mod sampler;
pub mod status;
pub mod tick;

pub use brightness::{BrightnessCell, BrightnessController, BrightnessReader, BrightnessWriter};
pub use display::{DisplayDriver, DisplayFrame, FrameCounter};
pub use error::{CycleError, DisplayError, PowerError, StatusError};
pub use foreground::Foreground;
pub use power::{PowerSequencer, PowerState};
pub use sampler::{AnalogSampler, ConversionState, Converter};
pub use status::StatusReporter;
pub use tick::{SoftwareTimer, TickHandler, TickSlot, TickTimer};
