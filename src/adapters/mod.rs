//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                     |
//! |------------|---------------------|---------------------------------|
//! | `log_sink` | EventSink           | `log` facade                    |
//! | `logger`   | `log::Log`          | stderr, level from env          |
//! | `sim`      | Board (all ports)   | simulated chamber + console LCD |
//! | `time`     | Clock               | `std::time::Instant`            |

pub mod log_sink;
pub mod logger;
pub mod sim;
pub mod time;
