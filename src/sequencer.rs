//! Gas sequencer: flush with CO2, then top up with N2 and Ar.
//!
//! ```text
//!  vacuum+air+CO2 open ──[flush_secs]──▶ CO2 close
//!        ──[P ≤ B·0.96]──▶ air+vacuum close
//!        ──▶ N2 open ──[P ≥ B·0.98]──▶ N2 close
//!        ──▶ Ar open ──[P ≥ B·1.00]──▶ Ar close
//! ```
//!
//! Each pressure gate is a busy-wait that re-reads the sensor on every
//! iteration.  The waits are bounded by
//! [`SystemConfig::pressure_wait_timeout`](crate::config::SystemConfig::pressure_wait_timeout)
//! and fail with [`Error::SequenceTimeout`] instead of hanging on a leak
//! or a stuck sensor.
//!
//! Valves are addressed through [`Valve`], which has no variant for the
//! indicator relay: the sequencer cannot touch the light the blinker owns.

use log::{debug, error, info};

use crate::app::ports::{Board, Clock, RelayBank, SensorPort};
use crate::error::{Error, Result, Stage};
use crate::fsm::context::ControllerContext;
use crate::indicator::FaultSignal;
use crate::pins;

// ---------------------------------------------------------------------------
// Mixture
// ---------------------------------------------------------------------------

/// One gas of the target mixture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasTarget {
    /// Relay on the gas bank.
    pub relay: u8,
    /// This gas's own share of baseline pressure.
    pub fraction: f64,
    /// Fraction of baseline reached once this gas is in (this gas plus all
    /// before it).  The valve closes when the chamber reaches it.
    pub cumulative: f64,
}

impl GasTarget {
    /// Absolute pressure (Pa) at which this gas's valve closes.
    pub fn threshold(&self, baseline: f64) -> f64 {
        baseline * self.cumulative
    }
}

/// The fixed Mars-analogue mixture.  Not configurable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixtureSpec {
    pub co2: GasTarget,
    pub n2: GasTarget,
    pub ar: GasTarget,
}

pub const MIXTURE: MixtureSpec = MixtureSpec {
    co2: GasTarget {
        relay: pins::CO2_RELAY,
        fraction: 0.96,
        cumulative: 0.96,
    },
    n2: GasTarget {
        relay: pins::N2_RELAY,
        fraction: 0.02,
        cumulative: 0.98,
    },
    ar: GasTarget {
        relay: pins::AR_RELAY,
        fraction: 0.02,
        cumulative: 1.00,
    },
};

// ---------------------------------------------------------------------------
// Valves
// ---------------------------------------------------------------------------

/// Which relay bank a valve sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bank {
    Gas,
    Aux,
}

/// Everything the sequencer is allowed to switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Valve {
    Air,
    Co2,
    N2,
    Ar,
    Vacuum,
}

impl Valve {
    pub const fn location(self) -> (Bank, u8) {
        match self {
            Self::Air => (Bank::Gas, pins::AIR_RELAY),
            Self::Co2 => (Bank::Gas, MIXTURE.co2.relay),
            Self::N2 => (Bank::Gas, MIXTURE.n2.relay),
            Self::Ar => (Bank::Gas, MIXTURE.ar.relay),
            Self::Vacuum => (Bank::Aux, pins::VACUUM_RELAY),
        }
    }
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

/// Runs one flush/fill sequence against the controller's hardware.
pub struct GasSequencer<'a, B: Board> {
    ctx: &'a mut ControllerContext<B>,
    fault: Option<&'a FaultSignal>,
}

impl<'a, B: Board> GasSequencer<'a, B> {
    pub fn new(ctx: &'a mut ControllerContext<B>) -> Self {
        Self { ctx, fault: None }
    }

    /// Abort the sequence if the blinker publishes a fault.
    pub fn with_fault_signal(mut self, fault: &'a FaultSignal) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Drive the whole sequence against `baseline` (Pa).  Blocks until the
    /// Ar valve has closed.
    pub fn run(&mut self, baseline: f64) -> Result<()> {
        // 1. Flush: purge with vacuum while injecting air and CO2.
        info!(
            "SEQUENCE: flushing for {}s",
            self.ctx.config.timing.flush_secs
        );
        self.open(Valve::Vacuum)?;
        self.open(Valve::Air)?;
        self.open(Valve::Co2)?;
        self.ctx.clock.sleep(self.ctx.config.timing.flush());
        self.check_fault()?;

        // 2. Stop CO2 and let the vacuum pull the chamber under the CO2 mark.
        self.close(Valve::Co2)?;
        let co2 = MIXTURE.co2.threshold(baseline);
        let p = self.wait_while(Stage::Drain, |p| co2 < p)?;
        info!("SEQUENCE: drained to {:.1} Pa (mark {:.1})", p, co2);

        // 3. Flush ends.
        self.close(Valve::Air)?;
        self.close(Valve::Vacuum)?;

        // 4. N2 up to the CO2+N2 fraction.
        self.open(Valve::N2)?;
        let n2 = MIXTURE.n2.threshold(baseline);
        let p = self.wait_while(Stage::FillN2, |p| p < n2)?;
        self.close(Valve::N2)?;
        info!("SEQUENCE: N2 in at {:.1} Pa (mark {:.1})", p, n2);

        // 5. Ar up to baseline.
        self.open(Valve::Ar)?;
        let ar = MIXTURE.ar.threshold(baseline);
        let p = self.wait_while(Stage::FillAr, |p| p < ar)?;
        self.close(Valve::Ar)?;
        info!("SEQUENCE: Ar in at {:.1} Pa (mark {:.1})", p, ar);

        Ok(())
    }

    // ── Internal ──────────────────────────────────────────────────

    fn open(&mut self, valve: Valve) -> Result<()> {
        self.switch(valve, true)
    }

    fn close(&mut self, valve: Valve) -> Result<()> {
        self.switch(valve, false)
    }

    fn switch(&mut self, valve: Valve, on: bool) -> Result<()> {
        debug!("SEQUENCE: {:?} {}", valve, if on { "open" } else { "close" });
        match valve.location() {
            (Bank::Gas, id) => self.ctx.gas_relays.set_pin(id, on)?,
            (Bank::Aux, id) => self.ctx.aux_relays.set_pin(id, on)?,
        }
        Ok(())
    }

    /// Spin on fresh pressure reads while `holds(p)`; return the first
    /// pressure for which it no longer holds.
    fn wait_while(&mut self, stage: Stage, holds: impl Fn(f64) -> bool) -> Result<f64> {
        let timeout = self.ctx.config.pressure_wait_timeout();
        let started = self.ctx.clock.now();
        loop {
            self.check_fault()?;
            let p = self.ctx.sensor.read_pressure()?;
            if !holds(p) {
                return Ok(p);
            }
            if self.ctx.clock.now().saturating_sub(started) >= timeout {
                error!("SEQUENCE: {} stuck at {:.1} Pa", stage, p);
                return Err(Error::SequenceTimeout(stage));
            }
        }
    }

    fn check_fault(&self) -> Result<()> {
        match self.fault.and_then(FaultSignal::try_take) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
