//! Display text: fixed messages and 20-column line formatting.
//!
//! Lines are built in a `heapless::String` sized to the panel width, so a
//! formatted value that would overflow is cut at column 20 instead of
//! wrapping into the next row.

use core::fmt::{self, Write};

use heapless::String;

use crate::app::ports::{DisplayPort, Reading};
use crate::error::WriteError;
use crate::pins::DISPLAY_COLS;

pub const BOOT_BANNER: &str = "Marsarium 9";
pub const GREETING: &str = "Godspeed little fern";
pub const MARSIFYING: &str = "**MARSIFYING**";
pub const WELCOME: &str = "Welcome to Mars.";
pub const WEATHER_HEADER: &str = "Current Weather:";
pub const FAULT_BANNER: &str = "FAULT";

/// Column of the digit in [`countdown_line`].
pub const COUNTDOWN_DIGIT_COL: u8 = 17;
/// Row used for the countdown and the live weather line.
pub const STATUS_ROW: u8 = 3;

/// One display row.
pub type Line = String<DISPLAY_COLS>;

/// Writer that drops everything past the panel width.
struct Truncating<'a>(&'a mut Line);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Format into a single row, truncating at the panel width.
pub fn fit(args: fmt::Arguments<'_>) -> Line {
    let mut line = Line::new();
    let _ = Truncating(&mut line).write_fmt(args);
    line
}

/// Split `text` into panel-width rows.
pub fn wrap(text: &str) -> impl Iterator<Item = Line> + '_ {
    let mut rest = text;
    core::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let split = rest
            .char_indices()
            .nth(DISPLAY_COLS)
            .map_or(rest.len(), |(i, _)| i);
        let (head, tail) = rest.split_at(split);
        rest = tail;
        Some(fit(format_args!("{}", head)))
    })
}

pub fn countdown_line(remaining: u32) -> Line {
    fit(format_args!("Marsification in {}", remaining))
}

pub fn countdown_digit(remaining: u32) -> Line {
    fit(format_args!("{}", remaining))
}

/// `22C, 45%RH, 1013hPa`
pub fn weather_line(r: &Reading) -> Line {
    fit(format_args!(
        "{:2.0}C, {:2.0}%RH, {:3.0}hPa",
        r.temperature_c,
        r.humidity_pct,
        r.pressure_pa / 100.0
    ))
}

/// Move the cursor and write one line.
pub fn put(
    display: &mut impl DisplayPort,
    col: u8,
    row: u8,
    text: &str,
) -> Result<(), WriteError> {
    display.set_cursor(col, row)?;
    display.write(text)
}
