//! System configuration parameters
//!
//! Timing and hardening knobs for the controller.  The defaults are the
//! production values; a JSON file may override them on the host build.
//! Mixture fractions are absent; they are fixed constants
//! in [`crate::sequencer::MixtureSpec`].

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fixed durations of the Marsify cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingSpec {
    /// Vacuum + air + CO2 purge (seconds)
    pub flush_secs: u32,
    /// Countdown between button press and Marsify (seconds)
    pub countdown_secs: u32,
    /// Countdown tick and indicator blink period (milliseconds)
    pub tick_ms: u32,
    /// Monitor refresh period (milliseconds)
    pub monitor_refresh_ms: u32,
}

impl Default for TimingSpec {
    fn default() -> Self {
        Self {
            flush_secs: 39,
            countdown_secs: 5,
            tick_ms: 1000,
            monitor_refresh_ms: 1000,
        }
    }
}

impl TimingSpec {
    pub fn flush(&self) -> Duration {
        Duration::from_secs(self.flush_secs.into())
    }

    pub fn countdown(&self) -> Duration {
        Duration::from_secs(self.countdown_secs.into())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.into())
    }

    pub fn monitor_refresh(&self) -> Duration {
        Duration::from_millis(self.monitor_refresh_ms.into())
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub timing: TimingSpec,

    // --- Hardening ---
    /// How long the button must read low before Idle accepts the press.
    /// 0 disables debouncing: a single low read starts the countdown.
    pub button_debounce_ms: u32,
    /// Upper bound on each pressure-gated wait of the gas sequence (seconds)
    pub pressure_wait_timeout_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            timing: TimingSpec::default(),
            button_debounce_ms: 0,
            pressure_wait_timeout_secs: 600, // 10 min
        }
    }
}

impl SystemConfig {
    pub fn button_debounce(&self) -> Duration {
        Duration::from_millis(self.button_debounce_ms.into())
    }

    pub fn pressure_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.pressure_wait_timeout_secs.into())
    }

    /// Reject values that would stall or spin the control loop.
    pub fn validate(&self) -> Result<()> {
        if self.timing.tick_ms == 0 {
            return Err(Error::Config("tick_ms must be non-zero"));
        }
        if self.timing.monitor_refresh_ms == 0 {
            return Err(Error::Config("monitor_refresh_ms must be non-zero"));
        }
        if self.timing.countdown_secs == 0 {
            return Err(Error::Config("countdown_secs must be non-zero"));
        }
        if self.pressure_wait_timeout_secs == 0 {
            return Err(Error::Config("pressure_wait_timeout_secs must be non-zero"));
        }
        Ok(())
    }

    /// Parse and validate a JSON override file.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }
}
