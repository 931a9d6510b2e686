//! GPIO drivers and press detection.

pub mod button;
pub mod relay;
