//! Indicator blinker: flashes the Marsify-button light while the gas
//! sequence runs.
//!
//! ```text
//!  control thread                     indicator-blinker thread
//!  ──────────────                     ────────────────────────
//!  Blinker::spawn() ───────────────▶  loop {
//!  calibrate + sequence                 sleep(tick)
//!        │                              cancel? ──▶ stop
//!        │  ◀── FaultSignal ──────────  toggle indicator (fail ⇒ signal fault, stop)
//!  handle.cancel() ──CancelSignal──▶  }
//! ```
//!
//! Cancellation is cooperative and observed at each tick boundary, so the
//! blinker stops within one period and never toggles after seeing it.
//! The indicator relay is only ever written by this task during Marsify.

use std::sync::Arc;
use std::thread::JoinHandle;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{debug, error, info};

use crate::app::ports::{Clock, RelayBank};
use crate::error::{Error, Result};
use crate::fsm::context::SharedRelays;
use crate::pins;

/// Single-shot stop request, control thread → blinker.
pub type CancelSignal = Signal<CriticalSectionRawMutex, ()>;

/// Fatal error raised on the blinker thread, blinker → control thread.
pub type FaultSignal = Signal<CriticalSectionRawMutex, Error>;

/// Name given to the blinker's OS thread.
pub const THREAD_NAME: &str = "indicator-blinker";

/// The periodic toggle loop.
pub struct Blinker<R, C> {
    relays: SharedRelays<R>,
    clock: C,
    period: core::time::Duration,
    cancel: Arc<CancelSignal>,
    fault: Arc<FaultSignal>,
}

impl<R: RelayBank, C: Clock> Blinker<R, C> {
    pub fn new(
        relays: SharedRelays<R>,
        clock: C,
        period: core::time::Duration,
        cancel: Arc<CancelSignal>,
        fault: Arc<FaultSignal>,
    ) -> Self {
        Self {
            relays,
            clock,
            period,
            cancel,
            fault,
        }
    }

    /// Blink until cancelled.  Returns the number of toggles made.
    ///
    /// A relay failure is published on the fault signal before returning.
    pub fn run(&mut self) -> Result<u32> {
        let mut toggles = 0;
        loop {
            self.clock.sleep(self.period);
            if self.cancel.try_take().is_some() {
                debug!("BLINK: cancelled after {} toggles", toggles);
                return Ok(toggles);
            }
            if let Err(e) = self.toggle() {
                error!("BLINK: indicator relay failed: {}", e);
                self.fault.signal(e);
                return Err(e);
            }
            toggles += 1;
        }
    }

    fn toggle(&self) -> Result<()> {
        self.relays.with(|bank| -> Result<()> {
            let lit = bank.get_pin(pins::INDICATOR_RELAY)?;
            bank.set_pin(pins::INDICATOR_RELAY, !lit)?;
            Ok(())
        })
    }
}

impl<R, C> Blinker<R, C>
where
    R: RelayBank + Send + 'static,
    C: Clock + Send + 'static,
{
    /// Start blinking on a dedicated thread.
    pub fn spawn(
        relays: SharedRelays<R>,
        clock: C,
        period: core::time::Duration,
    ) -> std::io::Result<BlinkerHandle> {
        let cancel = Arc::new(CancelSignal::new());
        let fault = Arc::new(FaultSignal::new());
        let mut blinker = Self::new(
            relays,
            clock,
            period,
            Arc::clone(&cancel),
            Arc::clone(&fault),
        );

        let thread = std::thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || {
                let _ = blinker.run();
            })?;

        info!("BLINK: started, period {:?}", period);
        Ok(BlinkerHandle {
            cancel,
            fault,
            thread: Some(thread),
        })
    }
}

/// Control-thread side of a running blinker.
///
/// Dropping the handle without [`cancel`](Self::cancel) (an error path)
/// cancels and waits for the thread, so nothing toggles the light once
/// the safety shutdown starts.
pub struct BlinkerHandle {
    cancel: Arc<CancelSignal>,
    fault: Arc<FaultSignal>,
    thread: Option<JoinHandle<()>>,
}

impl BlinkerHandle {
    /// Fault raised by the blinker, for the sequencer to poll.
    pub fn fault(&self) -> &FaultSignal {
        &self.fault
    }

    /// Stop the blinker and wait for its thread, at most one period.
    /// Reports a fault the blinker raised but nobody consumed yet, or a
    /// panic on the blinker thread as `Error::Task`.
    pub fn cancel(mut self) -> Result<()> {
        self.cancel.signal(());
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| Error::Task("indicator blinker panicked"))?;
        }
        info!("BLINK: stopped");
        match self.fault.try_take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for BlinkerHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.cancel.signal(());
            if thread.join().is_err() {
                error!("BLINK: blinker thread panicked");
            } else {
                debug!("BLINK: stopped on unwind");
            }
        }
    }
}
