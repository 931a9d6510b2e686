//! Port traits: the hexagonal boundary between the controller and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (sensor, relay expanders, button, display, clock)
//! implement these traits.  The [`Controller`](super::controller::Controller)
//! consumes them through a single [`Board`] parameter, so the state
//! machine never touches a bus directly.
//!
//! Every call is synchronous and blocking.  All port errors are typed;
//! whether a failure is fatal is decided by the caller, not the adapter.

use core::time::Duration;

use crate::error::{ReadError, WriteError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One combined measurement from the environmental sensor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reading {
    /// Degrees Celsius.
    pub temperature_c: f64,
    /// Relative humidity (%).
    pub humidity_pct: f64,
    /// Absolute pressure (Pa).
    pub pressure_pa: f64,
}

/// Read-side port for the pressure/temperature/humidity sensor.
pub trait SensorPort {
    fn read(&mut self) -> Result<Reading, ReadError>;

    /// Pressure-only convenience used by the calibrator and sequencer.
    fn read_pressure(&mut self) -> Result<f64, ReadError> {
        self.read().map(|r| r.pressure_pa)
    }
}

// ───────────────────────────────────────────────────────────────
// Relay bank port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// A bank of relays addressed by small integer identifiers.
///
/// `true` energises the relay (valve open, pump running, light on).
pub trait RelayBank {
    fn set_pin(&mut self, id: u8, on: bool) -> Result<(), WriteError>;

    fn get_pin(&mut self, id: u8) -> Result<bool, ReadError>;
}

// ───────────────────────────────────────────────────────────────
// Button port
// ───────────────────────────────────────────────────────────────

/// Digital signal level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// The Marsify button.  Active low: `Level::Low` means pressed.
pub trait ButtonPort {
    fn read(&mut self) -> Result<Level, ReadError>;
}

// ───────────────────────────────────────────────────────────────
// Display port
// ───────────────────────────────────────────────────────────────

/// Character display, 20 columns × 4 rows.
pub trait DisplayPort {
    fn clear(&mut self) -> Result<(), WriteError>;

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), WriteError>;

    /// Write `text` at the cursor, advancing it.
    fn write(&mut self, text: &str) -> Result<(), WriteError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic time plus a blocking sleep.
///
/// The countdown deadline, blinker period and pressure-wait bound are all
/// measured against this, which lets tests run the full cycle on virtual
/// time.
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);

    /// Block until `deadline` (as returned by [`now`](Clock::now)).
    /// Returns immediately if the deadline has already passed.
    fn sleep_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            self.sleep(deadline - now);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Board: the full set of concrete ports
// ───────────────────────────────────────────────────────────────

/// Bundles the concrete adapter types for one physical (or simulated)
/// chamber so the controller takes a single type parameter.
///
/// The auxiliary bank and the clock cross into the blinker thread, hence
/// the `Send + 'static` bounds on those two only.
pub trait Board {
    type Sensor: SensorPort;
    type GasRelays: RelayBank;
    type AuxRelays: RelayBank + Send + 'static;
    type Button: ButtonPort;
    type Display: DisplayPort;
    type Clock: Clock + Clone + Send + 'static;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The controller emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
