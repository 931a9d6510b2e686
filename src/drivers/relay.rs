//! Relay bank over plain GPIO lines.
//!
//! The production board drives its relays through PCAL9535A I²C
//! expanders; a bench rig can wire relay modules straight to GPIO.  This
//! adapter covers the latter with any `embedded-hal` stateful output pins,
//! pin `i` of the array answering to relay id `i`.

use embedded_hal::digital::{PinState, StatefulOutputPin};

use crate::app::ports::RelayBank;
use crate::error::{ReadError, WriteError};

pub struct GpioRelayBank<P, const N: usize> {
    pins: [P; N],
    /// Relay modules that energise on a low line.
    active_low: bool,
}

impl<P: StatefulOutputPin, const N: usize> GpioRelayBank<P, N> {
    pub fn new(pins: [P; N]) -> Self {
        Self {
            pins,
            active_low: false,
        }
    }

    pub fn active_low(pins: [P; N]) -> Self {
        Self {
            pins,
            active_low: true,
        }
    }

    fn pin(&mut self, id: u8) -> Option<&mut P> {
        self.pins.get_mut(usize::from(id))
    }
}

impl<P: StatefulOutputPin, const N: usize> RelayBank for GpioRelayBank<P, N> {
    fn set_pin(&mut self, id: u8, on: bool) -> Result<(), WriteError> {
        let level = PinState::from(on != self.active_low);
        let pin = self.pin(id).ok_or(WriteError::Relay)?;
        pin.set_state(level).map_err(|_| WriteError::Relay)
    }

    fn get_pin(&mut self, id: u8) -> Result<bool, ReadError> {
        let active_low = self.active_low;
        let pin = self.pin(id).ok_or(ReadError::Relay)?;
        let high = pin.is_set_high().map_err(|_| ReadError::Relay)?;
        Ok(high != active_low)
    }
}
