//! Unified error types for the Marsarium controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's fatal-error path uniform.  All variants are `Copy` so
//! they can travel through the blinker's fault signal and the safety
//! shutdown without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor, button or relay could not be read.
    Read(ReadError),
    /// A relay or the display could not be written.
    Write(WriteError),
    /// A pressure-gated wait did not resolve within the configured bound.
    SequenceTimeout(Stage),
    /// Configuration is invalid.
    Config(&'static str),
    /// A background task could not be started.
    Task(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(e) => write!(f, "read: {e}"),
            Self::Write(e) => write!(f, "write: {e}"),
            Self::SequenceTimeout(stage) => write!(f, "timeout: {stage}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Task(msg) => write!(f, "task: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Read errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// Pressure/temperature/humidity sensor bus fault.
    Sensor,
    /// Button GPIO read failed.
    Button,
    /// Relay expander state could not be read back.
    Relay,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor => write!(f, "sensor read failed"),
            Self::Button => write!(f, "button read failed"),
            Self::Relay => write!(f, "relay read failed"),
        }
    }
}

impl From<ReadError> for Error {
    fn from(e: ReadError) -> Self {
        Self::Read(e)
    }
}

// ---------------------------------------------------------------------------
// Write errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    /// Relay expander write failed.
    Relay,
    /// Character display write failed.
    Display,
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relay => write!(f, "relay write failed"),
            Self::Display => write!(f, "display write failed"),
        }
    }
}

impl From<WriteError> for Error {
    fn from(e: WriteError) -> Self {
        Self::Write(e)
    }
}

// ---------------------------------------------------------------------------
// Sequence stages
// ---------------------------------------------------------------------------

/// Pressure-gated stages of the gas sequence.  Carried by
/// [`Error::SequenceTimeout`] so the log says which valve was open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Vacuum draining the chamber after the CO2 flush.
    Drain,
    /// N2 valve open, filling to the CO2+N2 fraction.
    FillN2,
    /// Ar valve open, filling to baseline.
    FillAr,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drain => write!(f, "vacuum drain"),
            Self::FillN2 => write!(f, "N2 fill"),
            Self::FillAr => write!(f, "Ar fill"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
