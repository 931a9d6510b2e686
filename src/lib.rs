//! Marsarium controller library.
//!
//! Exposes the hardware-agnostic core (FSM, gas sequencer, indicator,
//! safety) for integration testing and for the host simulator binary.
//! Concrete hardware is reached only through the port traits in
//! [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod calibrator;
pub mod config;
pub mod display;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod indicator;
pub mod pins;
pub mod safety;
pub mod sequencer;
