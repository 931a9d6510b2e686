//! Controller: the hexagonal core.
//!
//! [`Controller`] owns the FSM and the single [`ControllerContext`].  It
//! exposes a hardware-agnostic API: all I/O flows through the port
//! traits bundled in the [`Board`], so the whole loop runs against mock
//! adapters in tests.
//!
//! ```text
//!  SensorPort ───▶ ┌──────────────────────────┐ ──▶ EventSink
//!  ButtonPort ───▶ │        Controller        │
//!  RelayBank ×2 ◀──│  FSM · Sequencer · Blink │
//!  DisplayPort ◀───└──────────────────────────┘
//! ```

use core::convert::Infallible;

use log::info;

use crate::app::ports::{Board, DisplayPort};
use crate::display;
use crate::error::Result;
use crate::fsm::context::ControllerContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::safety;

use super::events::AppEvent;
use super::ports::EventSink;

/// The controller orchestrates all domain logic.
pub struct Controller<B: Board> {
    fsm: Fsm<B>,
    ctx: ControllerContext<B>,
    started: bool,
}

impl<B: Board> Controller<B> {
    /// Construct the controller around its hardware context.
    ///
    /// Does **not** touch the hardware. Call [`start`](Self::start) or
    /// [`run`](Self::run) next.
    pub fn new(ctx: ControllerContext<B>) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx,
            started: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Show the boot banner and enter Idle.
    pub fn start(&mut self, sink: &mut impl EventSink) -> Result<()> {
        self.ctx.display.clear()?;
        display::put(&mut self.ctx.display, 0, 0, display::BOOT_BANNER)?;
        self.fsm.start(&mut self.ctx)?;
        self.started = true;
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("Controller started in {:?}", self.fsm.current_state());
        Ok(())
    }

    /// Run until a fatal error.
    ///
    /// There is no normal exit: Monitor loops forever.  On error the
    /// chamber is driven to its safe relay configuration, a
    /// [`AppEvent::Fault`] is emitted, and the error is returned.
    pub fn run(&mut self, sink: &mut impl EventSink) -> Result<Infallible> {
        loop {
            if let Err(e) = self.advance(sink) {
                safety::safe_shutdown(&mut self.ctx, &e);
                sink.emit(&AppEvent::Fault(e));
                return Err(e);
            }
        }
    }

    /// Apply one transition: `step(state, context) -> next state`.
    ///
    /// Errors are returned as-is; safety shutdown is [`run`](Self::run)'s
    /// job, so tests can inspect the relay state at the point of failure.
    pub fn step(&mut self, sink: &mut impl EventSink) -> Result<StateId> {
        self.advance(sink)?;
        Ok(self.fsm.current_state())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Hardware context, for inspection.
    pub fn context(&self) -> &ControllerContext<B> {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ControllerContext<B> {
        &mut self.ctx
    }

    // ── Internal ──────────────────────────────────────────────

    fn advance(&mut self, sink: &mut impl EventSink) -> Result<()> {
        if !self.started {
            self.start(sink)?;
        }

        let prev = self.fsm.current_state();
        let next = self.fsm.tick(&mut self.ctx)?;

        if let Some(baseline) = self.ctx.baseline.take() {
            sink.emit(&AppEvent::Calibrated(baseline));
        }
        if let Some(reading) = self.ctx.last_reading.take() {
            sink.emit(&AppEvent::Weather(reading));
        }
        if next != prev {
            sink.emit(&AppEvent::StateChanged {
                from: prev,
                to: next,
            });
        }
        Ok(())
    }
}
