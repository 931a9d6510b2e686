//! Relay, GPIO and I²C assignments for the Marsarium board.
//!
//! Single source of truth. Every module references this one rather than
//! hard-coding relay numbers.  The bus addresses are consumed by whatever
//! brings the buses up; the core only ever sees the relay identifiers.

// ---------------------------------------------------------------------------
// Gas relay bank (PCAL9535A @ GAS_RELAYS_I2C_ADDR)
// ---------------------------------------------------------------------------

/// Ambient-air inlet solenoid.
pub const AIR_RELAY: u8 = 0;
/// CO2 cylinder solenoid.
pub const CO2_RELAY: u8 = 1;
/// N2 cylinder solenoid.
pub const N2_RELAY: u8 = 2;
/// Ar cylinder solenoid.
pub const AR_RELAY: u8 = 3;

// ---------------------------------------------------------------------------
// Auxiliary relay bank (PCAL9535A @ AUX_RELAYS_I2C_ADDR)
// ---------------------------------------------------------------------------

/// Light inside the Marsify push-button.
pub const INDICATOR_RELAY: u8 = 2;
/// Vacuum pump.
pub const VACUUM_RELAY: u8 = 3;

// ---------------------------------------------------------------------------
// Digital input
// ---------------------------------------------------------------------------

/// Marsify push-button, active low.
pub const BUTTON_GPIO: u8 = 14;

// ---------------------------------------------------------------------------
// I²C bus
// ---------------------------------------------------------------------------

pub const I2C_BUS: u8 = 1;
/// HD44780 behind a PCF8574 backpack.
pub const DISPLAY_I2C_ADDR: u8 = 0x25;
pub const AUX_RELAYS_I2C_ADDR: u8 = 0x26;
pub const GAS_RELAYS_I2C_ADDR: u8 = 0x27;
/// BME280 pressure/temperature/humidity sensor.
pub const SENSOR_I2C_ADDR: u8 = 0x77;

// ---------------------------------------------------------------------------
// Display geometry
// ---------------------------------------------------------------------------

pub const DISPLAY_COLS: usize = 20;
pub const DISPLAY_ROWS: usize = 4;
