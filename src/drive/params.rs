//! # Drive Parameters
//!
//! Runtime-tunable drive settings and the button bindings that change them.
//!
//! | Button | Arcade | Tank |
//! |--------|--------|------|
//! | Circle (○) | turn multiplier +10% | turn threshold +10 |
//! | Square (□) | turn multiplier -10% | turn threshold -10 |
//! | Triangle (△) | switch to tank | switch to arcade |
//! | Options | toggle auxiliary motors | toggle auxiliary motors |
//!
//! Each action fires on the press edge only; holding a button does nothing
//! further until it is released and pressed again.

use serde::Deserialize;
use std::fmt;
use tracing::info;

use crate::controller::buttons::{Button, EdgeDetector};
use crate::controller::decoder::{EventKind, InputEvent};

/// Lowest turn multiplier, in percent.
pub const MULTIPLIER_PCT_MIN: u8 = 10;
/// Highest turn multiplier, in percent (no turn reduction).
pub const MULTIPLIER_PCT_MAX: u8 = 100;
/// Turn multiplier change per press, in percent.
pub const MULTIPLIER_PCT_STEP: u8 = 10;

/// Lowest tank turn threshold (wheels forced to equal power).
pub const THRESHOLD_MIN: i32 = 0;
/// Highest tank turn threshold (no turn limiting).
pub const THRESHOLD_MAX: i32 = 200;
/// Turn threshold change per press.
pub const THRESHOLD_STEP: i32 = 10;

/// Default deadband, in scaled power units.
pub const DEFAULT_DEADBAND: i32 = 10;

/// Selected control law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveMode {
    /// Right stick: Y drives, X turns.
    #[default]
    Arcade,
    /// Left stick Y drives the left wheel, right stick Y the right wheel.
    Tank,
}

impl DriveMode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            DriveMode::Arcade => DriveMode::Tank,
            DriveMode::Tank => DriveMode::Arcade,
        }
    }

    /// Short label for the status display.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DriveMode::Arcade => "Arc",
            DriveMode::Tank => "Tank",
        }
    }
}

impl fmt::Display for DriveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Current drive parameters.
///
/// Both the arcade multiplier and the tank threshold are kept at all times,
/// so switching modes and back restores the earlier tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlParameters {
    pub mode: DriveMode,
    /// Arcade turn multiplier in percent (10-100).
    pub turn_multiplier_pct: u8,
    /// Tank maximum left/right power difference (0-200).
    pub turn_threshold: i32,
    /// Stick magnitudes below this are treated as zero.
    pub deadband: i32,
}

impl Default for ControlParameters {
    fn default() -> Self {
        Self {
            mode: DriveMode::Arcade,
            turn_multiplier_pct: MULTIPLIER_PCT_MAX,
            turn_threshold: THRESHOLD_MAX,
            deadband: DEFAULT_DEADBAND,
        }
    }
}

impl ControlParameters {
    /// Turn multiplier as a fraction (0.1-1.0).
    #[must_use]
    pub fn turn_multiplier(&self) -> f32 {
        f32::from(self.turn_multiplier_pct) / 100.0
    }

    /// Value tuned by Circle/Square in the current mode.
    #[must_use]
    pub fn tuning_value(&self) -> i32 {
        match self.mode {
            DriveMode::Arcade => i32::from(self.turn_multiplier_pct),
            DriveMode::Tank => self.turn_threshold,
        }
    }

    /// Status line describing the tuning, e.g. `Turn:70% Arc`.
    #[must_use]
    pub fn status_line(&self) -> String {
        match self.mode {
            DriveMode::Arcade => format!("Turn:{}% {}", self.turn_multiplier_pct, self.mode),
            DriveMode::Tank => format!("Turn:{} {}", self.turn_threshold, self.mode),
        }
    }
}

/// A parameter change caused by a button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterChange {
    /// Turn multiplier (arcade) or threshold (tank) changed; carries the new value.
    /// Also reported when the value was already at its limit.
    Tuning(i32),
    /// Drive mode switched.
    Mode(DriveMode),
    /// Auxiliary motors enabled or disabled.
    Aux(bool),
}

/// Owns [`ControlParameters`] and applies button presses to them.
///
/// # Examples
///
/// ```
/// use pad_drive::controller::buttons::Button;
/// use pad_drive::controller::decoder::{EventKind, InputEvent};
/// use pad_drive::drive::params::{ControlParameters, ParameterChange, ParameterController};
///
/// let mut params = ParameterController::new(ControlParameters::default(), false);
/// let square = InputEvent::new(EventKind::Button, Button::Square.code(), 1);
///
/// assert_eq!(params.handle(&square), Some(ParameterChange::Tuning(90)));
/// assert_eq!(params.handle(&square), None); // still held
/// ```
#[derive(Debug, Clone)]
pub struct ParameterController {
    params: ControlParameters,
    aux_enabled: bool,
    edges: EdgeDetector,
}

impl ParameterController {
    /// Creates a controller with the given starting parameters.
    #[must_use]
    pub fn new(params: ControlParameters, aux_enabled: bool) -> Self {
        Self {
            params,
            aux_enabled,
            edges: EdgeDetector::new(),
        }
    }

    /// Current parameters.
    #[must_use]
    pub fn params(&self) -> &ControlParameters {
        &self.params
    }

    /// Whether auxiliary motors are enabled.
    #[must_use]
    pub fn aux_enabled(&self) -> bool {
        self.aux_enabled
    }

    /// Feeds one event. Returns the change it caused, if any.
    ///
    /// Only button events are considered; everything else returns `None`.
    pub fn handle(&mut self, event: &InputEvent) -> Option<ParameterChange> {
        if event.kind != EventKind::Button {
            return None;
        }
        let button = Button::from_code(event.code)?;
        if !self.edges.rising(button, event.value != 0) {
            return None;
        }

        let change = match button {
            Button::Circle => ParameterChange::Tuning(self.increase()),
            Button::Square => ParameterChange::Tuning(self.decrease()),
            Button::Triangle => {
                self.params.mode = self.params.mode.toggled();
                ParameterChange::Mode(self.params.mode)
            }
            Button::Options => {
                self.aux_enabled = !self.aux_enabled;
                ParameterChange::Aux(self.aux_enabled)
            }
            _ => return None,
        };

        info!("{:?} pressed: {}", button, self.params.status_line());
        Some(change)
    }

    /// Raises the current mode's tuning value by one step.
    pub fn increase(&mut self) -> i32 {
        match self.params.mode {
            DriveMode::Arcade => {
                self.params.turn_multiplier_pct = self
                    .params
                    .turn_multiplier_pct
                    .saturating_add(MULTIPLIER_PCT_STEP)
                    .min(MULTIPLIER_PCT_MAX);
            }
            DriveMode::Tank => {
                self.params.turn_threshold =
                    (self.params.turn_threshold + THRESHOLD_STEP).min(THRESHOLD_MAX);
            }
        }
        self.params.tuning_value()
    }

    /// Lowers the current mode's tuning value by one step.
    pub fn decrease(&mut self) -> i32 {
        match self.params.mode {
            DriveMode::Arcade => {
                self.params.turn_multiplier_pct = self
                    .params
                    .turn_multiplier_pct
                    .saturating_sub(MULTIPLIER_PCT_STEP)
                    .max(MULTIPLIER_PCT_MIN);
            }
            DriveMode::Tank => {
                self.params.turn_threshold =
                    (self.params.turn_threshold - THRESHOLD_STEP).max(THRESHOLD_MIN);
            }
        }
        self.params.tuning_value()
    }
}
