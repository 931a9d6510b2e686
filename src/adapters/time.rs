//! Host time adapter.
//!
//! Implements [`Clock`] over `std::time::Instant` and `thread::sleep`.
//! Clones share the same epoch, so the blinker thread and the controller
//! agree on "now".

use std::thread;
use std::time::{Duration, Instant};

use crate::app::ports::Clock;

/// Monotonic wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
