//! Gas sequencer and safety shutdown against the mock board.
//!
//! The sensor script is followed by a failing fallback, so a wait that
//! reads one sample too many or too few shows up as an error instead of
//! passing silently.

use std::time::Duration;

use crate::mock_hw::{BankId, MockClock, Rig};

use marsarium::error::{Error, ReadError, Stage};
use marsarium::indicator::FaultSignal;
use marsarium::pins;
use marsarium::safety;
use marsarium::sequencer::GasSequencer;

const BASELINE: f64 = 1000.0;

fn rig_with(pressures: &[f64]) -> Rig {
    let mut rig = Rig::new();
    rig.sensor.push_pressures(pressures).fail_when_exhausted();
    rig
}

#[test]
fn each_gate_resolves_on_reaching_its_mark_exactly() {
    // drain to 960, N2 to 980, Ar to 1000: equality ends each wait.
    let (mut ctx, journal, _) =
        rig_with(&[999.0, 960.0, 975.0, 980.0, 999.9, 1000.0]).into_context();

    GasSequencer::new(&mut ctx).run(BASELINE).unwrap();

    assert_eq!(ctx.sensor.remaining(), 0);
    for id in [pins::AIR_RELAY, pins::CO2_RELAY, pins::N2_RELAY, pins::AR_RELAY] {
        assert!(!journal.state(BankId::Gas, id), "gas relay {id} left open");
    }
    assert!(!journal.state(BankId::Aux, pins::VACUUM_RELAY));
}

#[test]
fn flush_lasts_the_configured_time() {
    let (mut ctx, _, clock) = rig_with(&[900.0, 990.0, 1010.0]).into_context();
    ctx.config.timing.flush_secs = 12;

    GasSequencer::new(&mut ctx).run(BASELINE).unwrap();
    assert_eq!(clock.elapsed(), Duration::from_secs(12));
}

#[test]
fn sequencer_never_writes_the_indicator() {
    let (mut ctx, journal, _) = rig_with(&[900.0, 990.0, 1010.0]).into_context();

    GasSequencer::new(&mut ctx).run(BASELINE).unwrap();

    assert!(journal.writes_to(BankId::Aux, pins::INDICATOR_RELAY).is_empty());
    assert_eq!(journal.writes().len(), 10);
}

#[test]
fn stuck_fill_times_out_then_safe_shutdown_closes_it() {
    let mut rig = Rig::new();
    rig.config.pressure_wait_timeout_secs = 5;
    rig.clock = MockClock::new().with_step_on_now(Duration::from_millis(250));
    // Drains, then N2 never gets past 970.
    rig.sensor.push_pressures(&[950.0]);
    rig.sensor.push_pressures(&[970.0; 100]);
    let (mut ctx, journal, _) = rig.into_context();

    let err = GasSequencer::new(&mut ctx).run(BASELINE).unwrap_err();
    assert_eq!(err, Error::SequenceTimeout(Stage::FillN2));
    assert!(journal.state(BankId::Gas, pins::N2_RELAY), "N2 still open at timeout");

    assert!(safety::safe_shutdown(&mut ctx, &err));
    assert!(!journal.state(BankId::Gas, pins::N2_RELAY));
    assert!(!journal.state(BankId::Aux, pins::INDICATOR_RELAY));
    assert_eq!(ctx.display.texts()[..2], ["FAULT", "timeout: N2 fill"]);
}

#[test]
fn sensor_failure_mid_sequence_propagates() {
    let (mut ctx, journal, _) = rig_with(&[950.0, 960.0]).into_context();

    let err = GasSequencer::new(&mut ctx).run(BASELINE).unwrap_err();
    assert_eq!(err, Error::Read(ReadError::Sensor));
    assert!(journal.state(BankId::Gas, pins::N2_RELAY));
}

#[test]
fn pending_fault_aborts_after_the_flush() {
    let (mut ctx, journal, _) = rig_with(&[900.0, 990.0, 1010.0]).into_context();
    let fault = FaultSignal::new();
    fault.signal(Error::Task("indicator blinker"));

    let err = GasSequencer::new(&mut ctx)
        .with_fault_signal(&fault)
        .run(BASELINE)
        .unwrap_err();

    assert_eq!(err, Error::Task("indicator blinker"));
    assert_eq!(journal.writes().len(), 3, "only the flush valves opened");
    assert_eq!(ctx.sensor.reads, 0);
}

#[test]
fn safe_shutdown_reports_unreachable_relays() {
    let mut rig = Rig::new();
    rig.gas.fail_id = Some(pins::CO2_RELAY);
    let (mut ctx, journal, _) = rig.into_context();

    assert!(!safety::safe_shutdown(&mut ctx, &Error::Config("test")));
    // Every other relay was still driven off.
    assert_eq!(journal.writes().len(), 5);
    assert!(journal.writes_to(BankId::Gas, pins::CO2_RELAY).is_empty());
}
