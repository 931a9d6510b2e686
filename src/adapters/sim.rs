//! Host simulator board.
//!
//! Stands in for the I²C sensor, both relay expanders, the button and the
//! LCD so the controller binary runs end-to-end on a workstation.
//!
//! All adapters share one [`Chamber`] model.  Pressure integrates the
//! valve states since the last access:
//!
//! | Open                 | dP/dt                      |
//! |----------------------|----------------------------|
//! | CO2, N2 or Ar valve  | `+FILL_RATE_PA_S` each     |
//! | vacuum pump          | `-PUMP_RATE_PA_S`          |
//!
//! so the flush holds the chamber near ambient and each fill ramps it
//! back up.  The indicator relay has no effect on the model.

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::trace;

use crate::app::ports::{
    Board, ButtonPort, Clock, DisplayPort, Level, Reading, RelayBank, SensorPort,
};
use crate::config::SystemConfig;
use crate::error::{self, ReadError, WriteError};
use crate::fsm::context::ControllerContext;
use crate::pins::{self, DISPLAY_COLS, DISPLAY_ROWS};

use super::time::SystemClock;

/// Sea-level ambient (Pa).
pub const AMBIENT_PA: f64 = 101_325.0;
pub const FILL_RATE_PA_S: f64 = 800.0;
pub const PUMP_RATE_PA_S: f64 = 800.0;

// ───────────────────────────────────────────────────────────────
// Chamber model
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct ChamberState {
    pressure_pa: f64,
    temperature_c: f64,
    humidity_pct: f64,
    gas: [bool; 4],
    aux: [bool; 4],
    last_update: Duration,
}

impl ChamberState {
    fn rate(&self) -> f64 {
        let fills = [pins::CO2_RELAY, pins::N2_RELAY, pins::AR_RELAY]
            .iter()
            .filter(|&&id| self.gas[usize::from(id)])
            .count();
        let mut rate = fills as f64 * FILL_RATE_PA_S;
        if self.aux[usize::from(pins::VACUUM_RELAY)] {
            rate -= PUMP_RATE_PA_S;
        }
        rate
    }

    fn advance(&mut self, now: Duration) {
        let dt = now.saturating_sub(self.last_update).as_secs_f64();
        self.pressure_pa = (self.pressure_pa + self.rate() * dt).max(0.0);
        self.last_update = now;
    }
}

/// Shared physical state behind every simulated adapter.
#[derive(Clone)]
pub struct Chamber {
    state: Arc<Mutex<ChamberState>>,
    clock: SystemClock,
}

impl Chamber {
    pub fn new(clock: SystemClock) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChamberState {
                pressure_pa: AMBIENT_PA,
                temperature_c: 21.0,
                humidity_pct: 40.0,
                gas: [false; 4],
                aux: [false; 4],
                last_update: clock.now(),
            })),
            clock,
        }
    }

    /// Lock the model with its pressure brought up to date.
    fn with<T>(&self, f: impl FnOnce(&mut ChamberState) -> T) -> Option<T> {
        let mut state = self.state.lock().ok()?;
        state.advance(self.clock.now());
        Some(f(&mut state))
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor
// ───────────────────────────────────────────────────────────────

pub struct SimSensor {
    chamber: Chamber,
}

impl SensorPort for SimSensor {
    fn read(&mut self) -> Result<Reading, ReadError> {
        self.chamber
            .with(|s| Reading {
                temperature_c: s.temperature_c,
                humidity_pct: s.humidity_pct,
                pressure_pa: s.pressure_pa,
            })
            .ok_or(ReadError::Sensor)
    }
}

// ───────────────────────────────────────────────────────────────
// Relay banks
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BankKind {
    Gas,
    Aux,
}

/// One PCAL9535A expander's worth of relays.
pub struct SimRelays {
    chamber: Chamber,
    kind: BankKind,
}

impl SimRelays {
    fn slot(id: u8) -> Option<usize> {
        let i = usize::from(id);
        (i < 4).then_some(i)
    }
}

impl RelayBank for SimRelays {
    fn set_pin(&mut self, id: u8, on: bool) -> Result<(), WriteError> {
        let i = Self::slot(id).ok_or(WriteError::Relay)?;
        let kind = self.kind;
        self.chamber
            .with(|s| match kind {
                BankKind::Gas => s.gas[i] = on,
                BankKind::Aux => s.aux[i] = on,
            })
            .ok_or(WriteError::Relay)?;
        trace!("SIM: {:?} relay {} -> {}", kind, id, on);
        Ok(())
    }

    fn get_pin(&mut self, id: u8) -> Result<bool, ReadError> {
        let i = Self::slot(id).ok_or(ReadError::Relay)?;
        let kind = self.kind;
        self.chamber
            .with(|s| match kind {
                BankKind::Gas => s.gas[i],
                BankKind::Aux => s.aux[i],
            })
            .ok_or(ReadError::Relay)
    }
}

// ───────────────────────────────────────────────────────────────
// Button
// ───────────────────────────────────────────────────────────────

/// Reads high until `press_after` has elapsed, then low.
pub struct SimButton {
    clock: SystemClock,
    press_after: Duration,
}

impl ButtonPort for SimButton {
    fn read(&mut self) -> Result<Level, ReadError> {
        if self.clock.now() >= self.press_after {
            Ok(Level::Low)
        } else {
            Ok(Level::High)
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Display
// ───────────────────────────────────────────────────────────────

/// 20×4 framebuffer redrawn to stdout after every write.
pub struct ConsoleDisplay {
    frame: [[u8; DISPLAY_COLS]; DISPLAY_ROWS],
    col: usize,
    row: usize,
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self {
            frame: [[b' '; DISPLAY_COLS]; DISPLAY_ROWS],
            col: 0,
            row: 0,
        }
    }
}

impl ConsoleDisplay {
    /// Row `row` of the framebuffer as text.
    pub fn line(&self, row: usize) -> &str {
        self.frame
            .get(row)
            .and_then(|r| core::str::from_utf8(r).ok())
            .unwrap_or("")
    }

    fn render(&self) -> Result<(), WriteError> {
        let mut out = std::io::stdout().lock();
        let border = "-".repeat(DISPLAY_COLS);
        let mut draw = || -> std::io::Result<()> {
            writeln!(out, "+{}+", border)?;
            for row in 0..DISPLAY_ROWS {
                writeln!(out, "|{}|", self.line(row))?;
            }
            writeln!(out, "+{}+", border)
        };
        draw().map_err(|_| WriteError::Display)
    }
}

impl DisplayPort for ConsoleDisplay {
    fn clear(&mut self) -> Result<(), WriteError> {
        *self = Self::default();
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), WriteError> {
        let (col, row) = (usize::from(col), usize::from(row));
        if col >= DISPLAY_COLS || row >= DISPLAY_ROWS {
            return Err(WriteError::Display);
        }
        self.col = col;
        self.row = row;
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<(), WriteError> {
        for b in text.bytes() {
            if self.col >= DISPLAY_COLS {
                break;
            }
            self.frame[self.row][self.col] = if b.is_ascii() { b } else { b'?' };
            self.col += 1;
        }
        self.render()
    }
}

// ───────────────────────────────────────────────────────────────
// Board
// ───────────────────────────────────────────────────────────────

/// Marker type selecting the simulated adapters.
pub struct SimBoard;

impl Board for SimBoard {
    type Sensor = SimSensor;
    type GasRelays = SimRelays;
    type AuxRelays = SimRelays;
    type Button = SimButton;
    type Display = ConsoleDisplay;
    type Clock = SystemClock;
}

/// Wire a fresh chamber to every port.  The button presses itself after
/// `press_after`.
pub fn context(
    config: SystemConfig,
    press_after: Duration,
) -> error::Result<ControllerContext<SimBoard>> {
    let clock = SystemClock::new();
    let chamber = Chamber::new(clock);
    ControllerContext::new(
        SimSensor {
            chamber: chamber.clone(),
        },
        SimRelays {
            chamber: chamber.clone(),
            kind: BankKind::Gas,
        },
        SimRelays {
            chamber,
            kind: BankKind::Aux,
        },
        SimButton { clock, press_after },
        ConsoleDisplay::default(),
        clock,
        config,
    )
}
