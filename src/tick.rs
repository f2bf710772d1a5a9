//! Periodic tick abstraction.
//!
//! The timer overflow interrupt does not call into application code directly.
//! Instead a [`TickHandler`] is registered in a [`TickSlot`] (usually a
//! `static`), and whatever produces ticks fires the slot: the hardware
//! interrupt on the board, [`SoftwareTimer`] on a host.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};

/// Work performed once per timer period.
pub trait TickHandler {
    type Error;

    fn on_tick(&mut self) -> Result<(), Self::Error>;
}

/// Source of periodic overflow notifications.
pub trait TickTimer {
    /// Starts delivering ticks. From here on the handler may preempt the caller.
    fn start(&mut self);

    /// Stops delivering ticks.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// Registration point shared between setup code and the tick context.
///
/// Every access runs inside a critical section, so the handler is never
/// observed half-registered and never runs concurrently with itself.
pub struct TickSlot<H> {
    handler: Mutex<CriticalSectionRawMutex, RefCell<Option<H>>>,
}

impl<H> TickSlot<H> {
    pub const fn new() -> Self {
        Self {
            handler: Mutex::new(RefCell::new(None)),
        }
    }

    /// Installs `handler`, returning the one it replaces.
    pub fn register(&self, handler: H) -> Option<H> {
        self.handler.lock(|slot| slot.borrow_mut().replace(handler))
    }

    /// Removes the registered handler.
    pub fn take(&self) -> Option<H> {
        self.handler.lock(|slot| slot.borrow_mut().take())
    }

    pub fn is_registered(&self) -> bool {
        self.handler.lock(|slot| slot.borrow().is_some())
    }

    /// Runs `f` on the registered handler, if any.
    pub fn with<R>(&self, f: impl FnOnce(&mut H) -> R) -> Option<R> {
        self.handler.lock(|slot| slot.borrow_mut().as_mut().map(f))
    }
}

impl<H: TickHandler> TickSlot<H> {
    /// Delivers one tick. Returns `None` when no handler is registered.
    pub fn fire(&self) -> Option<Result<(), H::Error>> {
        self.with(TickHandler::on_tick)
    }
}

impl<H> Default for TickSlot<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Tick source for environments without the hardware timer.
///
/// Ticks are delivered synchronously by [`advance`](Self::advance).
pub struct SoftwareTimer<'a, H> {
    slot: &'a TickSlot<H>,
    running: bool,
    elapsed: u32,
}

impl<'a, H: TickHandler> SoftwareTimer<'a, H> {
    pub fn new(slot: &'a TickSlot<H>) -> Self {
        Self {
            slot,
            running: false,
            elapsed: 0,
        }
    }

    /// Lets `ticks` timer periods pass, firing the slot once per period while
    /// running.
    ///
    /// Returns how many ticks reached a handler. Handler errors do not stop
    /// the timer, same as an interrupt that cannot report failure.
    pub fn advance(&mut self, ticks: u32) -> u32 {
        if !self.running {
            return 0;
        }
        let mut serviced = 0;
        for _ in 0..ticks {
            self.elapsed = self.elapsed.wrapping_add(1);
            if self.slot.fire().is_some() {
                serviced += 1;
            }
        }
        serviced
    }

    /// Periods elapsed while running.
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }
}

impl<H: TickHandler> TickTimer for SoftwareTimer<'_, H> {
    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
