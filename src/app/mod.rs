//! Application core: the control loop and its hardware boundary.
//!
//! The [`controller`] owns the FSM and the single hardware context.  All
//! interaction with hardware happens through the **port traits** defined
//! in [`ports`], keeping this layer testable without real peripherals.

pub mod controller;
pub mod events;
pub mod ports;
