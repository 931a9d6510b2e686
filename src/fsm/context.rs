//! The single hardware context threaded through every FSM handler.
//!
//! `ControllerContext` owns every port handle for the lifetime of the
//! process.  State handlers borrow it mutably; it is never cloned.  The
//! auxiliary relay bank is the one handle that also crosses into the
//! blinker thread, so it sits behind a shared blocking mutex.

use core::cell::RefCell;
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::app::ports::{Board, Reading, RelayBank};
use crate::config::SystemConfig;
use crate::drivers::button::Debouncer;

/// Auxiliary relay bank shared between the control thread and the blinker.
pub struct SharedRelays<R> {
    inner: Arc<Mutex<CriticalSectionRawMutex, RefCell<R>>>,
}

impl<R> SharedRelays<R> {
    pub fn new(relays: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RefCell::new(relays))),
        }
    }

    /// Run `f` with exclusive access to the bank.
    pub fn with<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

impl<R: RelayBank> SharedRelays<R> {
    pub fn set_pin(&self, id: u8, on: bool) -> Result<(), crate::error::WriteError> {
        self.with(|bank| bank.set_pin(id, on))
    }

    pub fn get_pin(&self, id: u8) -> Result<bool, crate::error::ReadError> {
        self.with(|bank| bank.get_pin(id))
    }
}

// Only the blinker gets a second handle; it is not part of the public
// surface so the context stays the single owner everywhere else.
impl<R> SharedRelays<R> {
    pub(crate) fn share(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// The shared context passed to every state handler function.
pub struct ControllerContext<B: Board> {
    // -- Hardware --
    pub sensor: B::Sensor,
    pub gas_relays: B::GasRelays,
    pub aux_relays: SharedRelays<B::AuxRelays>,
    pub button: B::Button,
    pub display: B::Display,
    pub clock: B::Clock,

    // -- Configuration --
    pub config: SystemConfig,

    // -- Idle debounce --
    pub debouncer: Debouncer,

    // -- Outputs for the controller to publish --
    /// Baseline calibrated by the last Marsify, taken by the controller.
    pub baseline: Option<f64>,
    /// Reading shown by the last Monitor refresh, taken by the controller.
    pub last_reading: Option<Reading>,
}

impl<B: Board> ControllerContext<B> {
    /// Fails with `Error::Config` if `config` does not validate; the
    /// countdown and monitor loops assume non-zero periods.
    pub fn new(
        sensor: B::Sensor,
        gas_relays: B::GasRelays,
        aux_relays: B::AuxRelays,
        button: B::Button,
        display: B::Display,
        clock: B::Clock,
        config: SystemConfig,
    ) -> crate::error::Result<Self> {
        config.validate()?;
        let debouncer = Debouncer::new(config.button_debounce());
        Ok(Self {
            sensor,
            gas_relays,
            aux_relays: SharedRelays::new(aux_relays),
            button,
            display,
            clock,
            config,
            debouncer,
            baseline: None,
            last_reading: None,
        })
    }
}
