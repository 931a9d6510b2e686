//! Atmospheric baseline calibration.
//!
//! One warm-up read is thrown away (the BME280's first conversion after
//! idle is stale), then [`CALIBRATION_SAMPLES`] back-to-back reads are
//! averaged.  No outlier rejection: the result tracks sensor noise, and
//! the mixture thresholds are tolerant of that.

use log::info;

use crate::app::ports::SensorPort;
use crate::error::Result;

/// Number of pressure samples averaged into the baseline.
pub const CALIBRATION_SAMPLES: usize = 10;

/// Return the mean of [`CALIBRATION_SAMPLES`] pressure reads (Pa), after
/// one discarded warm-up read.
pub fn calibrate(sensor: &mut impl SensorPort) -> Result<f64> {
    sensor.read_pressure()?;

    let mut sum = 0.0;
    for _ in 0..CALIBRATION_SAMPLES {
        sum += sensor.read_pressure()?;
    }
    let baseline = sum / CALIBRATION_SAMPLES as f64;

    info!("CALIBRATE: baseline {:.1} Pa", baseline);
    Ok(baseline)
}
