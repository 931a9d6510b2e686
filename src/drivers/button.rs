//! Marsify button: press detection and an `embedded-hal` GPIO adapter.
//!
//! ## Hardware
//!
//! Active-low momentary switch with pull-up on [`BUTTON_GPIO`](crate::pins::BUTTON_GPIO).
//! Idle polls it in a tight loop with no sleep.
//!
//! ## Debounce
//!
//! | `button_debounce_ms` | Press accepted when                          |
//! |----------------------|----------------------------------------------|
//! | 0 (default)          | a single low read is seen                    |
//! | N > 0                | reads stay low for N ms without a high read  |
//!
//! With the default every low read counts, so burst presses all register.

use core::time::Duration;

use embedded_hal::digital::InputPin;

use crate::app::ports::{ButtonPort, Level};
use crate::error::ReadError;

/// Press detector fed with raw levels from the Idle poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    window: Duration,
    low_since: Option<Duration>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            low_since: None,
        }
    }

    /// Feed one sample taken at `now`.  Returns `true` when the press is
    /// accepted; the detector then re-arms.
    pub fn update(&mut self, level: Level, now: Duration) -> bool {
        if level == Level::High {
            self.low_since = None;
            return false;
        }
        if self.window.is_zero() {
            return true;
        }

        let since = *self.low_since.get_or_insert(now);
        if now.saturating_sub(since) >= self.window {
            self.low_since = None;
            return true;
        }
        false
    }
}

/// [`ButtonPort`] over any `embedded-hal` input pin.
pub struct GpioButton<P> {
    pin: P,
}

impl<P: InputPin> GpioButton<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> ButtonPort for GpioButton<P> {
    fn read(&mut self) -> Result<Level, ReadError> {
        match self.pin.is_low() {
            Ok(true) => Ok(Level::Low),
            Ok(false) => Ok(Level::High),
            Err(_) => Err(ReadError::Button),
        }
    }
}
