//! Safe shutdown after a fatal error.
//!
//! An interrupted gas sequence can leave a cylinder venting into the
//! chamber or the vacuum pump running against a sealed lid.  Before the
//! control loop gives up it drives every relay it knows about to the safe
//! position:
//!
//! | Relay      | Bank | Safe state |
//! |------------|------|------------|
//! | CO2        | gas  | closed     |
//! | N2         | gas  | closed     |
//! | Ar         | gas  | closed     |
//! | air        | gas  | closed     |
//! | vacuum     | aux  | off        |
//! | indicator  | aux  | off        |
//!
//! Every step is attempted even when an earlier one fails (the fault that
//! got us here may well be on the same bus), and the fault is then shown
//! on the display if it still responds.

use log::{error, info, warn};

use crate::app::ports::{Board, DisplayPort, RelayBank};
use crate::display;
use crate::error::Error;
use crate::fsm::context::ControllerContext;
use crate::pins;

const GAS_SHUTDOWN_ORDER: [(u8, &str); 4] = [
    (pins::CO2_RELAY, "CO2"),
    (pins::N2_RELAY, "N2"),
    (pins::AR_RELAY, "Ar"),
    (pins::AIR_RELAY, "air"),
];

const AUX_SHUTDOWN_ORDER: [(u8, &str); 2] = [
    (pins::VACUUM_RELAY, "vacuum"),
    (pins::INDICATOR_RELAY, "indicator"),
];

/// Drive all relays safe and show `fault` on the display.
/// Returns `true` if every relay write succeeded.
pub fn safe_shutdown<B: Board>(ctx: &mut ControllerContext<B>, fault: &Error) -> bool {
    error!("SAFETY: fatal {}, shutting down", fault);
    let mut clean = true;

    for (id, name) in GAS_SHUTDOWN_ORDER {
        if let Err(e) = ctx.gas_relays.set_pin(id, false) {
            warn!("SAFETY: could not close {} valve: {}", name, e);
            clean = false;
        }
    }
    for (id, name) in AUX_SHUTDOWN_ORDER {
        if let Err(e) = ctx.aux_relays.set_pin(id, false) {
            warn!("SAFETY: could not switch off {}: {}", name, e);
            clean = false;
        }
    }

    if let Err(e) = show_fault(&mut ctx.display, fault) {
        warn!("SAFETY: fault not shown: {}", e);
    }

    if clean {
        info!("SAFETY: chamber left in safe relay configuration");
    } else {
        error!("SAFETY: relay state unknown, inspect chamber manually");
    }
    clean
}

fn show_fault(d: &mut impl DisplayPort, fault: &Error) -> Result<(), crate::error::WriteError> {
    d.clear()?;
    display::put(d, 0, 0, display::FAULT_BANNER)?;
    let text = fault.to_string();
    for (row, line) in (1..pins::DISPLAY_ROWS as u8).zip(display::wrap(&text)) {
        display::put(d, 0, row, &line)?;
    }
    Ok(())
}
