//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events through the
//! `log` facade.  Whatever logger the binary installs decides where they
//! end up.

use log::{error, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::Calibrated(baseline) => {
                info!("CALIB | baseline={:.1}Pa", baseline);
            }
            AppEvent::Weather(r) => {
                info!(
                    "WEATHER | T={:.1}\u{00b0}C | RH={:.1}% | P={:.1}hPa",
                    r.temperature_c,
                    r.humidity_pct,
                    r.pressure_pa / 100.0,
                );
            }
            AppEvent::Fault(e) => {
                error!("FAULT | {}", e);
            }
        }
    }
}
