//! # Controller Input Mapper Module
//!
//! This module folds decoded [`InputEvent`]s from the PS4 controller into a
//! structured [`ControllerState`].
//!
//! ## Event Types
//!
//! - **EV_ABS (Absolute Axis)**: stick positions
//! - **EV_KEY (Key/Button)**: digital button presses
//! - **EV_SYN** and everything else: ignored
//!
//! ## Axis Codes (EV_ABS)
//!
//! | Axis | evdev Code | Raw | Range |
//! |------|------------|-----|-------|
//! | Left Stick X | ABS_X | 0 | 0-255 |
//! | Left Stick Y | ABS_Y | 1 | 0-255 |
//! | Right Stick X | ABS_RX | 3 | 0-255 |
//! | Right Stick Y | ABS_RY | 4 | 0-255 |
//!
//! Y axes grow downward: 0 is the stick pushed fully away from the driver.
//!
//! ## Usage
//!
//! ```
//! use pad_drive::controller::decoder::{EventKind, InputEvent};
//! use pad_drive::controller::mapper::EventMapper;
//!
//! let mut mapper = EventMapper::new();
//! mapper.process_event(&InputEvent::new(EventKind::Axis, 4, 0));
//! assert_eq!(mapper.state().right_stick_y, 0);
//! ```

use evdev::AbsoluteAxisType;
use tracing::trace;

use super::buttons::Button;
use super::decoder::{EventKind, InputEvent};

/// Raw axis value range from the controller.
pub const AXIS_MIN: i32 = 0;
/// Raw axis value range from the controller.
pub const AXIS_MAX: i32 = 255;
/// Resting stick value assumed before the first report.
pub const AXIS_CENTER: i32 = 124;

/// Snapshot of the sticks and buttons.
///
/// Axis values are raw (0-255). Scaling to motor power happens in the
/// drive module.
///
/// # Examples
///
/// ```
/// use pad_drive::controller::buttons::Button;
/// use pad_drive::controller::mapper::ControllerState;
///
/// let state = ControllerState::default();
/// assert_eq!(state.left_stick_y, 124);
/// assert!(!state.is_pressed(Button::Circle));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerState {
    /// Left stick X axis. 0 = full left, 255 = full right.
    pub left_stick_x: i32,
    /// Left stick Y axis. 0 = full up, 255 = full down.
    pub left_stick_y: i32,
    /// Right stick X axis. 0 = full left, 255 = full right.
    pub right_stick_x: i32,
    /// Right stick Y axis. 0 = full up, 255 = full down.
    pub right_stick_y: i32,

    pressed: [bool; Button::COUNT],
}

impl Default for ControllerState {
    /// Creates a new controller state with all sticks centered and buttons released.
    fn default() -> Self {
        Self {
            left_stick_x: AXIS_CENTER,
            left_stick_y: AXIS_CENTER,
            right_stick_x: AXIS_CENTER,
            right_stick_y: AXIS_CENTER,
            pressed: [false; Button::COUNT],
        }
    }
}

impl ControllerState {
    /// Creates a new controller state with default (centered/released) values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `button` is currently held.
    #[must_use]
    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed[button.index()]
    }

    /// Sets the held flag of `button`.
    pub fn set_pressed(&mut self, button: Button, pressed: bool) {
        self.pressed[button.index()] = pressed;
    }
}

/// Applies input events to a [`ControllerState`].
///
/// `EventMapper` is not thread-safe. Use it from the drive loop thread only.
#[derive(Debug, Default)]
pub struct EventMapper {
    state: ControllerState,
}

impl EventMapper {
    /// Creates a new event mapper with default controller state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ControllerState::default(),
        }
    }

    /// Returns a reference to the current controller state.
    #[must_use]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Returns a clone of the current controller state.
    #[must_use]
    pub fn state_snapshot(&self) -> ControllerState {
        self.state.clone()
    }

    /// Processes a single input event and updates internal state.
    ///
    /// Unknown axes and buttons are ignored and leave the state unchanged.
    pub fn process_event(&mut self, event: &InputEvent) {
        match event.kind {
            EventKind::Axis => self.process_axis_event(event.code, event.signed_value()),
            EventKind::Button => self.process_key_event(event.code, event.value != 0),
            EventKind::Sync => {}
            EventKind::Other(event_type) => {
                trace!("Ignoring event type {} code {}", event_type, event.code);
            }
        }
    }

    /// Processes an absolute axis event.
    fn process_axis_event(&mut self, code: u16, value: i32) {
        match AbsoluteAxisType(code) {
            AbsoluteAxisType::ABS_X => self.state.left_stick_x = value,
            AbsoluteAxisType::ABS_Y => self.state.left_stick_y = value,
            AbsoluteAxisType::ABS_RX => self.state.right_stick_x = value,
            AbsoluteAxisType::ABS_RY => self.state.right_stick_y = value,
            _ => {
                // Triggers, d-pad, motion sensors
                trace!("Ignoring axis code {}", code);
            }
        }
    }

    /// Processes a key/button event.
    fn process_key_event(&mut self, code: u16, pressed: bool) {
        match Button::from_code(code) {
            Some(button) => self.state.set_pressed(button, pressed),
            None => trace!("Ignoring button code {}", code),
        }
    }

    /// Resets all state to default (centered sticks, released buttons).
    pub fn reset(&mut self) {
        self.state = ControllerState::default();
    }
}
