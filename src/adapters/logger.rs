//! Host console logger.
//!
//! On the device the platform logger owns the `log` facade.  On the host
//! this minimal `log::Log` writes `LEVEL target: message` lines to stderr,
//! filtered by the level named in `MARSARIUM_LOG` (default `info`).

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable holding the maximum level (`error` … `trace`).
pub const LOG_ENV: &str = "MARSARIUM_LOG";

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut err = std::io::stderr().lock();
        let _ = writeln!(
            err,
            "{:<5} {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Parse a level name; unknown or empty names fall back to `Info`.
pub fn parse_level(name: Option<&str>) -> LevelFilter {
    name.and_then(|s| s.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the stderr logger.  Fails if a logger is already set.
pub fn init() -> Result<(), log::SetLoggerError> {
    let level = parse_level(std::env::var(LOG_ENV).ok().as_deref());
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
