//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers, monomorphised per
//! [`Board`], with no closures or dynamic dispatch.
//!
//! ```text
//!  IDLE ──[button low]──▶ COUNTDOWN ──[5 s deadline]──▶ MARSIFY
//!    ▲ │                                                  │
//!    └─┘ [button high]                       [Ar valve closed]
//!                                                         ▼
//!                                            MONITOR ◀──┐
//!                                               └───────┘ [every 1 s]
//! ```
//!
//! Any `Err` from a handler is fatal; the controller runs the safety
//! shutdown.  The one tolerated failure is a sensor read inside
//! [`refresh`], which skips that tick.

use log::{debug, info};

use super::context::ControllerContext;
use super::{StateDescriptor, StateId};
use crate::app::ports::{Board, ButtonPort, Clock, DisplayPort, SensorPort};
use crate::calibrator;
use crate::display;
use crate::error::{Error, Result};
use crate::indicator::Blinker;
use crate::pins;
use crate::sequencer::GasSequencer;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the state table for board `B`.  Called once at startup.
pub fn build_state_table<B: Board>() -> [StateDescriptor<B>; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: None,
            on_update: idle_update::<B>,
        },
        // Index 1: Countdown
        StateDescriptor {
            id: StateId::Countdown,
            name: "Countdown",
            on_enter: Some(countdown_enter::<B>),
            on_update: countdown_update::<B>,
        },
        // Index 2: Marsify
        StateDescriptor {
            id: StateId::Marsify,
            name: "Marsify",
            on_enter: Some(marsify_enter::<B>),
            on_update: marsify_update::<B>,
        },
        // Index 3: Monitor
        StateDescriptor {
            id: StateId::Monitor,
            name: "Monitor",
            on_enter: Some(monitor_enter::<B>),
            on_update: monitor_update::<B>,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state: waiting for the Marsify button
// ═══════════════════════════════════════════════════════════════════════════

fn idle_update<B: Board>(ctx: &mut ControllerContext<B>) -> Result<Option<StateId>> {
    let level = ctx.button.read()?;
    let now = ctx.clock.now();

    if ctx.debouncer.update(level, now) {
        info!("IDLE: Marsify button pressed");
        return Ok(Some(StateId::Countdown));
    }

    Ok(None)
}

// ═══════════════════════════════════════════════════════════════════════════
//  COUNTDOWN state: greeting, then 5…1 on the bottom row
// ═══════════════════════════════════════════════════════════════════════════

fn countdown_enter<B: Board>(ctx: &mut ControllerContext<B>) -> Result<()> {
    let secs = ctx.config.timing.countdown_secs;
    ctx.display.clear()?;
    display::put(&mut ctx.display, 0, 0, display::GREETING)?;
    display::put(
        &mut ctx.display,
        0,
        display::STATUS_ROW,
        &display::countdown_line(secs),
    )?;
    info!("COUNTDOWN: Marsify in {}s", secs);
    Ok(())
}

/// Two independent timers: a per-tick digit update and the overall
/// deadline.  The deadline wins whenever both are due.  The digit is
/// derived from elapsed time, so a late wake-up skips straight to the
/// current value and missed ticks are never replayed.
fn countdown_update<B: Board>(ctx: &mut ControllerContext<B>) -> Result<Option<StateId>> {
    let timing = ctx.config.timing;
    let tick = timing.tick();
    let tick_ms = u128::from(timing.tick_ms);
    let start = ctx.clock.now();
    let deadline = start + timing.countdown();

    let mut next_tick = start + tick;
    let mut shown = timing.countdown_secs;

    loop {
        ctx.clock.sleep_until(next_tick.min(deadline));
        let now = ctx.clock.now();
        if now >= deadline {
            break;
        }
        if now < next_tick {
            continue;
        }

        let elapsed = (now - start).as_millis() / tick_ms;
        let remaining = u32::try_from(elapsed)
            .map_or(0, |ticks| timing.countdown_secs.saturating_sub(ticks));
        if remaining > 0 && remaining != shown {
            display::put(
                &mut ctx.display,
                display::COUNTDOWN_DIGIT_COL,
                display::STATUS_ROW,
                &display::countdown_digit(remaining),
            )?;
            shown = remaining;
        }

        while next_tick <= now {
            next_tick += tick;
        }
    }

    Ok(Some(StateId::Marsify))
}

// ═══════════════════════════════════════════════════════════════════════════
//  MARSIFY state: calibrate, flush, fill; indicator blinking throughout
// ═══════════════════════════════════════════════════════════════════════════

fn marsify_enter<B: Board>(ctx: &mut ControllerContext<B>) -> Result<()> {
    ctx.display.clear()?;
    display::put(&mut ctx.display, 0, 0, display::MARSIFYING)?;
    Ok(())
}

fn marsify_update<B: Board>(ctx: &mut ControllerContext<B>) -> Result<Option<StateId>> {
    let blinker = Blinker::spawn(
        ctx.aux_relays.share(),
        ctx.clock.clone(),
        ctx.config.timing.tick(),
    )
    .map_err(|_| Error::Task("indicator blinker"))?;

    let baseline = calibrator::calibrate(&mut ctx.sensor)?;
    ctx.baseline = Some(baseline);

    GasSequencer::new(ctx)
        .with_fault_signal(blinker.fault())
        .run(baseline)?;

    blinker.cancel()?;
    info!("MARSIFY: chamber filled");
    Ok(Some(StateId::Monitor))
}

// ═══════════════════════════════════════════════════════════════════════════
//  MONITOR state: live weather, forever
// ═══════════════════════════════════════════════════════════════════════════

fn monitor_enter<B: Board>(ctx: &mut ControllerContext<B>) -> Result<()> {
    ctx.display.clear()?;
    display::put(&mut ctx.display, 0, 0, display::WELCOME)?;
    display::put(&mut ctx.display, 0, 2, display::WEATHER_HEADER)?;
    ctx.aux_relays.set_pin(pins::INDICATOR_RELAY, true)?;
    info!("MONITOR: indicator steady");
    Ok(())
}

fn monitor_update<B: Board>(ctx: &mut ControllerContext<B>) -> Result<Option<StateId>> {
    // Steady light, re-asserted every tick.
    ctx.aux_relays.set_pin(pins::INDICATOR_RELAY, true)?;

    refresh(ctx)?;
    ctx.clock.sleep(ctx.config.timing.monitor_refresh());

    Ok(Some(StateId::Monitor))
}

/// Show the current reading on the status row.
///
/// A sensor failure is not fatal here: the tick is skipped with no display
/// writes and `Ok(false)` is returned.  Display failures still are.
pub fn refresh<B: Board>(ctx: &mut ControllerContext<B>) -> Result<bool> {
    let reading = match ctx.sensor.read() {
        Ok(r) => r,
        Err(e) => {
            debug!("MONITOR: {}, skipping refresh", e);
            return Ok(false);
        }
    };

    display::put(
        &mut ctx.display,
        0,
        display::STATUS_ROW,
        &display::weather_line(&reading),
    )?;
    ctx.last_reading = Some(reading);
    Ok(true)
}
