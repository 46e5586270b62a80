//! Status display.
//!
//! The brick's LCD shows one short line at a time. Off the brick the same
//! lines go to the log.

use tracing::info;

use crate::drive::control::{ArcadeMix, MotorCommand};
use crate::drive::params::ControlParameters;

/// Shows short status lines to the driver.
pub trait StatusDisplay {
    fn show(&mut self, line: &str);
}

/// Writes status lines to the log under the `display` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDisplay;

impl StatusDisplay for LogDisplay {
    fn show(&mut self, line: &str) {
        info!(target: "display", "{}", line);
    }
}

/// Arcade status, e.g. `F=80 L=-20 T=70%`.
#[must_use]
pub fn arcade_status(mix: &ArcadeMix, params: &ControlParameters) -> String {
    format!(
        "F={} L={} T={}%",
        mix.forward.round() as i32,
        mix.turn.round() as i32,
        params.turn_multiplier_pct
    )
}

/// Tank status, e.g. `L=100 R=60 T=40`.
#[must_use]
pub fn tank_status(command: &MotorCommand, params: &ControlParameters) -> String {
    format!(
        "L={} R={} T={}",
        command.left, command.right, params.turn_threshold
    )
}
