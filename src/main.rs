//! Marsarium: Main Entry Point
//!
//! Runs the controller on the host simulator board.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimSensor     SimRelays ×2    SimButton    ConsoleDisplay     │
//! │  SystemClock   LogEventSink    stderr logger                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (pure logic)                   │    │
//! │  │  FSM · Calibrator · GasSequencer · Blinker · Safety    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `marsarium [config.json]`.  Log level comes from `MARSARIUM_LOG`.
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info};

use marsarium::adapters::log_sink::LogEventSink;
use marsarium::adapters::{logger, sim};
use marsarium::app::controller::Controller;
use marsarium::config::SystemConfig;

/// The simulated button is pressed this long after boot.
const SIM_PRESS_AFTER: Duration = Duration::from_secs(2);

fn main() -> Result<()> {
    logger::init().context("installing logger")?;

    info!("Marsarium v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(std::env::args().nth(1))?;
    info!(
        "Config: flush={}s countdown={}s tick={}ms refresh={}ms debounce={}ms wait_timeout={}s",
        config.timing.flush_secs,
        config.timing.countdown_secs,
        config.timing.tick_ms,
        config.timing.monitor_refresh_ms,
        config.button_debounce_ms,
        config.pressure_wait_timeout_secs,
    );

    let ctx = sim::context(config, SIM_PRESS_AFTER)?;
    let mut controller = Controller::new(ctx);
    let mut sink = LogEventSink::new();

    controller.start(&mut sink)?;

    // Only returns on a fatal error; the chamber has already been made safe.
    let err = match controller.run(&mut sink) {
        Ok(never) => match never {},
        Err(e) => e,
    };
    error!("Controller halted: {}", err);
    Err(err).context("controller halted")
}

fn load_config(path: Option<String>) -> Result<SystemConfig> {
    let Some(path) = path else {
        return Ok(SystemConfig::default());
    };
    let text =
        std::fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
    let config = SystemConfig::from_json(&text).with_context(|| format!("parsing {path}"))?;
    info!("Loaded config from {}", path);
    Ok(config)
}
