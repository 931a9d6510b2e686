//! Outbound application events.
//!
//! The [`Controller`](super::controller::Controller) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::error::Error;
use crate::fsm::StateId;

/// Structured events emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The controller has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// Marsify calibrated a new atmospheric baseline (Pa).
    Calibrated(f64),

    /// Monitor refreshed the weather line.
    Weather(crate::app::ports::Reading),

    /// A fatal error stopped the loop; safe shutdown has run.
    Fault(Error),
}
