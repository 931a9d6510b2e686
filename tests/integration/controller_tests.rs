//! Integration tests for the Controller → FSM → ports pipeline.
//!
//! These run on the host and drive the full Idle → Countdown → Marsify →
//! Monitor cycle against the mock board, on virtual time.

use std::time::Duration;

use crate::mock_hw::{
    AMBIENT, BankId, Journal, MockBoard, MockButton, MockClock, RecordingSink, Rig,
};

use marsarium::app::controller::Controller;
use marsarium::app::events::AppEvent;
use marsarium::app::ports::Level;
use marsarium::error::{Error, ReadError, Stage, WriteError};
use marsarium::fsm::StateId;
use marsarium::indicator::THREAD_NAME;
use marsarium::pins;

type TestController = Controller<MockBoard>;

fn started(rig: Rig) -> (TestController, Journal, MockClock, RecordingSink) {
    let (ctx, journal, clock) = rig.into_context();
    let mut controller = Controller::new(ctx);
    let mut sink = RecordingSink::new();
    controller.start(&mut sink).unwrap();
    (controller, journal, clock, sink)
}

/// Script a clean Marsify against a 1000 Pa baseline.
fn script_sequence(rig: &mut Rig) {
    rig.sensor
        .push_pressures(&[1000.0; 11]) // warm-up + calibration
        .push_pressures(&[990.0, 955.0]) // drain past 960
        .push_pressures(&[960.0, 981.0]) // N2 past 980
        .push_pressures(&[990.0, 1000.0]); // Ar to 1000
}

fn pressed_rig() -> Rig {
    let mut rig = Rig::new();
    rig.button = MockButton::new(&[Level::Low]);
    rig
}

/// Step until the controller has just entered Monitor.
fn step_to_monitor(c: &mut TestController, sink: &mut RecordingSink) {
    assert_eq!(c.step(sink).unwrap(), StateId::Countdown);
    assert_eq!(c.step(sink).unwrap(), StateId::Marsify);
    assert_eq!(c.step(sink).unwrap(), StateId::Monitor);
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_shows_banner_and_enters_idle() {
    let (c, _, _, sink) = started(Rig::new());
    assert_eq!(c.state(), StateId::Idle);
    assert_eq!(
        c.context().display.writes(),
        vec![(0, 0, "Marsarium 9".to_owned())]
    );
    assert_eq!(sink.events, vec![AppEvent::Started(StateId::Idle)]);
}

#[test]
fn zero_tick_period_is_rejected_at_construction() {
    let mut rig = Rig::new();
    rig.config.timing.tick_ms = 0;
    assert_eq!(
        rig.try_into_context().err(),
        Some(Error::Config("tick_ms must be non-zero"))
    );
}

// ── Idle ──────────────────────────────────────────────────────

#[test]
fn idle_stays_while_button_reads_high() {
    let mut rig = Rig::new();
    rig.button = MockButton::new(&[Level::High; 5]);
    let (mut c, journal, clock, mut sink) = started(rig);

    for _ in 0..5 {
        assert_eq!(c.step(&mut sink).unwrap(), StateId::Idle);
    }
    assert_eq!(c.context().button.reads, 5);
    assert!(journal.writes().is_empty(), "idle touches no relay");
    assert_eq!(clock.sleeps(), 0, "idle polls without sleeping");
}

#[test]
fn single_low_read_starts_countdown() {
    let mut rig = Rig::new();
    rig.button = MockButton::new(&[Level::High, Level::High, Level::Low]);
    let (mut c, _, _, mut sink) = started(rig);

    assert_eq!(c.step(&mut sink).unwrap(), StateId::Idle);
    assert_eq!(c.step(&mut sink).unwrap(), StateId::Idle);
    assert_eq!(c.step(&mut sink).unwrap(), StateId::Countdown);

    let writes = c.context().display.writes();
    assert!(writes.contains(&(0, 0, "Godspeed little fern".to_owned())));
    assert!(writes.contains(&(0, 3, "Marsification in 5".to_owned())));
    assert!(sink.events.contains(&AppEvent::StateChanged {
        from: StateId::Idle,
        to: StateId::Countdown,
    }));
}

#[test]
fn debounce_window_rejects_a_bounce() {
    let mut rig = Rig::new();
    rig.config.button_debounce_ms = 50;
    rig.clock = MockClock::new().with_step_on_now(Duration::from_millis(10));
    // now() reads 0, 10, 20, … ms on successive Idle polls.
    rig.button = MockButton::new(&[
        Level::Low,
        Level::High,
        Level::Low,
        Level::Low,
        Level::Low,
        Level::Low,
        Level::Low,
        Level::Low,
    ]);
    let (mut c, _, _, mut sink) = started(rig);

    for poll in 0..7 {
        assert_eq!(c.step(&mut sink).unwrap(), StateId::Idle, "poll {poll}");
    }
    // Low since 20 ms; accepted at 70 ms.
    assert_eq!(c.step(&mut sink).unwrap(), StateId::Countdown);
}

#[test]
fn button_read_failure_is_fatal() {
    let mut rig = Rig::new();
    rig.button.push_failure();
    let (mut c, _, _, mut sink) = started(rig);

    assert_eq!(
        c.step(&mut sink),
        Err(Error::Read(ReadError::Button))
    );
}

// ── Countdown ─────────────────────────────────────────────────

fn countdown_digits(c: &TestController) -> Vec<String> {
    c.context()
        .display
        .writes()
        .into_iter()
        .filter(|(col, row, _)| *col == 17 && *row == 3)
        .map(|(_, _, s)| s)
        .collect()
}

#[test]
fn countdown_counts_down_then_marsifies_at_deadline() {
    let (mut c, _, clock, mut sink) = started(pressed_rig());
    assert_eq!(c.step(&mut sink).unwrap(), StateId::Countdown);
    c.context_mut().display.reset();

    assert_eq!(c.step(&mut sink).unwrap(), StateId::Marsify);

    assert_eq!(countdown_digits(&c), vec!["4", "3", "2", "1"]);
    assert_eq!(clock.elapsed(), Duration::from_secs(5));
    assert_eq!(clock.sleeps(), 5);

    let writes = c.context().display.writes();
    assert_eq!(
        writes.last(),
        Some(&(0, 0, "**MARSIFYING**".to_owned())),
        "Marsify banner replaces the countdown"
    );
}

#[test]
fn delayed_tick_is_dropped_not_replayed() {
    let (mut c, _, clock, mut sink) = started(pressed_rig());
    assert_eq!(c.step(&mut sink).unwrap(), StateId::Countdown);
    c.context_mut().display.reset();

    // Second tick wakes at 3.5 s instead of 2 s: "3" is skipped and the
    // digit catches up with the clock.
    clock.stall_sleep(2, Duration::from_millis(1500));
    assert_eq!(c.step(&mut sink).unwrap(), StateId::Marsify);

    assert_eq!(countdown_digits(&c), vec!["4", "2", "1"]);
    assert_eq!(clock.elapsed(), Duration::from_secs(5));
}

#[test]
fn deadline_wins_over_a_due_tick() {
    let (mut c, _, clock, mut sink) = started(pressed_rig());
    assert_eq!(c.step(&mut sink).unwrap(), StateId::Countdown);
    c.context_mut().display.reset();

    // The wake-up meant for 4 s arrives at 7 s, past the deadline.
    clock.stall_sleep(4, Duration::from_secs(3));
    assert_eq!(c.step(&mut sink).unwrap(), StateId::Marsify);

    assert_eq!(countdown_digits(&c), vec!["4", "3", "2"]);
    assert_eq!(clock.elapsed(), Duration::from_secs(7));
}

// ── Marsify ───────────────────────────────────────────────────

#[test]
fn marsify_drives_valves_in_order_and_calibrates() {
    let mut rig = pressed_rig();
    script_sequence(&mut rig);
    let (mut c, journal, _, mut sink) = started(rig);
    step_to_monitor(&mut c, &mut sink);

    use BankId::{Aux, Gas};
    let valves: Vec<_> = journal
        .sequence_without(Aux, pins::INDICATOR_RELAY)
        .into_iter()
        .take(10)
        .collect();
    assert_eq!(
        valves,
        vec![
            (Aux, pins::VACUUM_RELAY, true),
            (Gas, pins::AIR_RELAY, true),
            (Gas, pins::CO2_RELAY, true),
            (Gas, pins::CO2_RELAY, false),
            (Gas, pins::AIR_RELAY, false),
            (Aux, pins::VACUUM_RELAY, false),
            (Gas, pins::N2_RELAY, true),
            (Gas, pins::N2_RELAY, false),
            (Gas, pins::AR_RELAY, true),
            (Gas, pins::AR_RELAY, false),
        ]
    );

    assert!(sink.events.contains(&AppEvent::Calibrated(1000.0)));
    assert_eq!(c.context().sensor.remaining(), 0, "every scripted read used");
}

#[test]
fn only_the_blinker_drives_the_indicator_during_marsify() {
    let mut rig = pressed_rig();
    script_sequence(&mut rig);
    let (mut c, journal, _, mut sink) = started(rig);

    assert_eq!(c.step(&mut sink).unwrap(), StateId::Countdown);
    assert_eq!(c.step(&mut sink).unwrap(), StateId::Marsify);
    journal.clear();
    assert_eq!(c.step(&mut sink).unwrap(), StateId::Monitor);

    // The last indicator write is Monitor's steady light; all before it
    // come from the blinker.
    let mut indicator = journal.writes_to(BankId::Aux, pins::INDICATOR_RELAY);
    let steady = indicator.pop().unwrap();
    assert!(steady.on);
    assert_ne!(steady.thread, THREAD_NAME);
    for w in indicator {
        assert_eq!(w.thread, THREAD_NAME, "indicator written by {}", w.thread);
    }
    for w in journal.writes() {
        if w.bank == BankId::Gas || w.id == pins::VACUUM_RELAY {
            assert_ne!(w.thread, THREAD_NAME, "blinker touched a valve");
        }
    }
}

#[test]
fn drain_timeout_is_fatal_and_leaves_chamber_safe() {
    let mut rig = pressed_rig();
    rig.config.pressure_wait_timeout_secs = 30;
    // Calibrate at 1000 Pa, then the chamber never drains.
    rig.sensor.push_pressures(&[1000.0; 11]);
    rig.clock = MockClock::new().with_step_on_now(Duration::from_millis(100));
    let (mut c, journal, _, mut sink) = started(rig);

    let err = c.run(&mut sink).unwrap_err();
    assert_eq!(err, Error::SequenceTimeout(Stage::Drain));
    assert_safe(&journal);
    assert_eq!(sink.events.last(), Some(&AppEvent::Fault(err)));
}

#[test]
fn blinker_relay_failure_aborts_the_sequence() {
    let mut rig = pressed_rig();
    rig.aux.fail_id = Some(pins::INDICATOR_RELAY);
    // Never drains: the sequence spins until the blinker's fault arrives.
    rig.sensor.push_pressures(&[1000.0; 11]);
    let (mut c, journal, _, mut sink) = started(rig);

    let err = c.run(&mut sink).unwrap_err();
    assert_eq!(err, Error::Write(WriteError::Relay));
    for id in [pins::AIR_RELAY, pins::CO2_RELAY, pins::N2_RELAY, pins::AR_RELAY] {
        assert!(!journal.state(BankId::Gas, id));
    }
    assert!(!journal.state(BankId::Aux, pins::VACUUM_RELAY));
}

#[test]
fn calibration_failure_runs_safe_shutdown() {
    let mut rig = pressed_rig();
    rig.sensor.push_pressures(&[1000.0; 4]).push_failure();
    let (mut c, journal, _, mut sink) = started(rig);

    let err = c.run(&mut sink).unwrap_err();
    assert_eq!(err, Error::Read(ReadError::Sensor));
    assert_safe(&journal);

    let texts = c.context().display.texts();
    assert_eq!(
        texts[texts.len() - 3..],
        ["FAULT", "read: sensor read fa", "iled"]
    );
}

#[test]
fn display_failure_is_fatal() {
    let mut rig = pressed_rig();
    // Banner: clear, cursor, write. Countdown enter fails on its first op.
    rig.display.fail_after = Some(3);
    let (mut c, journal, _, mut sink) = started(rig);

    let err = c.run(&mut sink).unwrap_err();
    assert_eq!(err, Error::Write(WriteError::Display));
    assert_safe(&journal);
}

/// Every relay of both banks ends off, and nothing is written after the
/// indicator goes dark.
fn assert_safe(journal: &Journal) {
    for id in [pins::AIR_RELAY, pins::CO2_RELAY, pins::N2_RELAY, pins::AR_RELAY] {
        assert!(!journal.state(BankId::Gas, id), "gas relay {id} left open");
    }
    for id in [pins::VACUUM_RELAY, pins::INDICATOR_RELAY] {
        assert!(!journal.state(BankId::Aux, id), "aux relay {id} left on");
    }
    let last = journal.writes().pop().unwrap();
    assert_eq!(
        (last.bank, last.id, last.on),
        (BankId::Aux, pins::INDICATOR_RELAY, false)
    );
    assert_ne!(last.thread, THREAD_NAME);
}

// ── Monitor ───────────────────────────────────────────────────

#[test]
fn monitor_shows_weather_and_steady_indicator() {
    let mut rig = pressed_rig();
    script_sequence(&mut rig);
    let (mut c, journal, clock, mut sink) = started(rig);
    step_to_monitor(&mut c, &mut sink);

    let writes = c.context().display.writes();
    assert!(writes.contains(&(0, 0, "Welcome to Mars.".to_owned())));
    assert!(writes.contains(&(0, 2, "Current Weather:".to_owned())));

    let before = clock.elapsed();
    for _ in 0..3 {
        assert_eq!(c.step(&mut sink).unwrap(), StateId::Monitor);
    }
    assert_eq!(clock.elapsed() - before, Duration::from_secs(3));

    let weather: Vec<_> = c
        .context()
        .display
        .writes()
        .into_iter()
        .filter(|(col, row, _)| (*col, *row) == (0, 3))
        .map(|(_, _, s)| s)
        .collect();
    assert_eq!(weather.last().map(String::as_str), Some("22C, 45%RH, 1013hPa"));
    assert!(journal.state(BankId::Aux, pins::INDICATOR_RELAY));
    assert_eq!(
        sink.events.iter().filter(|e| **e == AppEvent::Weather(AMBIENT)).count(),
        3
    );
}

#[test]
fn monitor_skips_ticks_while_sensor_fails() {
    let mut rig = pressed_rig();
    script_sequence(&mut rig);
    rig.sensor.push_failure().push_failure().push_failure();
    let (mut c, _, _, mut sink) = started(rig);
    step_to_monitor(&mut c, &mut sink);
    c.context_mut().display.reset();
    let events = sink.events.len();

    for _ in 0..3 {
        assert_eq!(c.step(&mut sink).unwrap(), StateId::Monitor);
    }
    assert!(c.context().display.ops.is_empty(), "no writes on failed reads");
    assert_eq!(sink.events.len(), events);

    assert_eq!(c.step(&mut sink).unwrap(), StateId::Monitor);
    assert_eq!(
        c.context().display.writes(),
        vec![(0, 3, "22C, 45%RH, 1013hPa".to_owned())]
    );
}

#[test]
fn monitor_never_leaves() {
    let mut rig = pressed_rig();
    script_sequence(&mut rig);
    let (mut c, _, _, mut sink) = started(rig);
    step_to_monitor(&mut c, &mut sink);

    for _ in 0..20 {
        assert_eq!(c.step(&mut sink).unwrap(), StateId::Monitor);
    }
    let changes = sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::StateChanged { .. }))
        .count();
    assert_eq!(changes, 3);
}
