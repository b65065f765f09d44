//! Text telemetry for the serial console.

use core::fmt::Write;

use heapless::String;

use crate::state::FlightStatus;

pub const LINE_CAPACITY: usize = 64;
pub type Line = String<LINE_CAPACITY>;

/// Four `\r\n`-terminated lines: mode, altitude, yaw, duty cycles.
pub fn format_report(status: &FlightStatus) -> [Line; 4] {
    let mut mode = Line::new();
    let mut altitude = Line::new();
    let mut yaw = Line::new();
    let mut duty = Line::new();

    // Every line is bounded well under the capacity, so writes cannot fail.
    let _ = write!(mode, "FLIGHT MODE: {}\r\n", status.state.as_str());
    let _ = write!(
        altitude,
        "ALTITUDE| current: {} target: {}\r\n",
        status.readings.height, status.targets.height
    );
    let _ = write!(
        yaw,
        "YAW     | current: {} target: {}\r\n",
        status.readings.yaw, status.targets.yaw
    );
    let _ = write!(
        duty,
        "DUTY CYC| main: {} tail: {}\r\n",
        status.duty.main, status.duty.tail
    );

    [mode, altitude, yaw, duty]
}
