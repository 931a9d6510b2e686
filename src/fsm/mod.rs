//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌───────────┬───────────────────┬──────────────────────┐│
//! │  │ StateId   │ on_enter          │ on_update            ││
//! │  ├───────────┼───────────────────┼──────────────────────┤│
//! │  │ Idle      │ —                 │ fn(ctx)->Result<Opt> ││
//! │  │ Countdown │ fn(ctx)->Result   │ fn(ctx)->Result<Opt> ││
//! │  │ Marsify   │ fn(ctx)->Result   │ fn(ctx)->Result<Opt> ││
//! │  │ Monitor   │ fn(ctx)->Result   │ fn(ctx)->Result<Opt> ││
//! │  └───────────┴───────────────────┴──────────────────────┘│
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Ok(Some(next_id))`, the engine runs `on_enter` for the
//! next state and updates the current pointer.  Handlers may block for
//! as long as their state lasts (the countdown runs its own timers, the
//! Marsify handler runs the whole gas sequence).
//!
//! Every handler returns `Result`: an `Err` is fatal and propagates out
//! of [`Fsm::tick`] untouched, leaving the current pointer where the
//! failure happened.

pub mod context;
pub mod states;

use context::ControllerContext;
use log::info;

use crate::app::ports::Board;
use crate::error::Result;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all controller states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    Countdown = 1,
    Marsify = 2,
    Monitor = 3,
}

impl StateId {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 4;
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` actions.  Runs once per transition.
pub type StateActionFn<B> = fn(&mut ControllerContext<B>) -> Result<()>;

/// Signature for the per-tick update handler.
/// Returns `Ok(Some(next))` to trigger a transition, or `Ok(None)` to stay.
pub type StateUpdateFn<B> = fn(&mut ControllerContext<B>) -> Result<Option<StateId>>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
pub struct StateDescriptor<B: Board> {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn<B>>,
    pub on_update: StateUpdateFn<B>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm<B: Board> {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor<B>; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl<B: Board> Fsm<B> {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor<B>; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut ControllerContext<B>) -> Result<()> {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx)?;
        }
        Ok(())
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, switch to `next` and run its `on_enter`.
    ///    A self-transition re-enters nothing; it is just "stay".
    pub fn tick(&mut self, ctx: &mut ControllerContext<B>) -> Result<StateId> {
        let next = (self.table[self.current].on_update)(ctx)?;

        if let Some(next_id) = next {
            if next_id as usize != self.current {
                self.transition(next_id, ctx)?;
            }
        }
        Ok(self.current_state())
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        self.table[self.current].id
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut ControllerContext<B>) -> Result<()> {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx)?;
        }
        Ok(())
    }
}
