//! # Buttons and Edge Detection
//!
//! The PS4 controller buttons this crate reacts to, and a rising-edge
//! detector so a held button acts once per press.
//!
//! | Button | evdev Code | Raw |
//! |--------|------------|-----|
//! | Cross (×) | BTN_SOUTH | 304 |
//! | Circle (○) | BTN_EAST | 305 |
//! | Triangle (△) | BTN_NORTH | 307 |
//! | Square (□) | BTN_WEST | 308 |
//! | L1 | BTN_TL | 310 |
//! | R1 | BTN_TR | 311 |
//! | L2 (click) | BTN_TL2 | 312 |
//! | R2 (click) | BTN_TR2 | 313 |
//! | Share | BTN_SELECT | 314 |
//! | Options | BTN_START | 315 |
//! | PS | BTN_MODE | 316 |

use evdev::Key;

/// A controller button with a known evdev code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Cross,
    Circle,
    Triangle,
    Square,
    L1,
    R1,
    L2,
    R2,
    Share,
    Options,
    Ps,
}

impl Button {
    /// Number of known buttons.
    pub const COUNT: usize = 11;

    /// Every known button, in index order.
    pub const ALL: [Button; Button::COUNT] = [
        Button::Cross,
        Button::Circle,
        Button::Triangle,
        Button::Square,
        Button::L1,
        Button::R1,
        Button::L2,
        Button::R2,
        Button::Share,
        Button::Options,
        Button::Ps,
    ];

    /// Looks up a button from a raw EV_KEY code.
    ///
    /// # Examples
    ///
    /// ```
    /// use pad_drive::controller::buttons::Button;
    ///
    /// assert_eq!(Button::from_code(305), Some(Button::Circle));
    /// assert_eq!(Button::from_code(999), None);
    /// ```
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        match Key::new(code) {
            Key::BTN_SOUTH => Some(Button::Cross),
            Key::BTN_EAST => Some(Button::Circle),
            Key::BTN_NORTH => Some(Button::Triangle),
            Key::BTN_WEST => Some(Button::Square),
            Key::BTN_TL => Some(Button::L1),
            Key::BTN_TR => Some(Button::R1),
            Key::BTN_TL2 => Some(Button::L2),
            Key::BTN_TR2 => Some(Button::R2),
            Key::BTN_SELECT => Some(Button::Share),
            Key::BTN_START => Some(Button::Options),
            Key::BTN_MODE => Some(Button::Ps),
            _ => None,
        }
    }

    /// Raw EV_KEY code of this button.
    #[must_use]
    pub fn code(self) -> u16 {
        let key = match self {
            Button::Cross => Key::BTN_SOUTH,
            Button::Circle => Key::BTN_EAST,
            Button::Triangle => Key::BTN_NORTH,
            Button::Square => Key::BTN_WEST,
            Button::L1 => Key::BTN_TL,
            Button::R1 => Key::BTN_TR,
            Button::L2 => Key::BTN_TL2,
            Button::R2 => Key::BTN_TR2,
            Button::Share => Key::BTN_SELECT,
            Button::Options => Key::BTN_START,
            Button::Ps => Key::BTN_MODE,
        };
        key.code()
    }

    /// Position in [`Button::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Remembers the last seen level of each button and reports press edges.
///
/// # Examples
///
/// ```
/// use pad_drive::controller::buttons::{Button, EdgeDetector};
///
/// let mut edges = EdgeDetector::new();
/// assert!(edges.rising(Button::Circle, true));   // pressed
/// assert!(!edges.rising(Button::Circle, true));  // still held
/// assert!(!edges.rising(Button::Circle, false)); // released
/// assert!(edges.rising(Button::Circle, true));   // pressed again
/// ```
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    previous: [bool; Button::COUNT],
}

impl EdgeDetector {
    /// Creates a detector with every button released.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the new level and returns `true` on released → pressed.
    pub fn rising(&mut self, button: Button, pressed: bool) -> bool {
        let was_pressed = std::mem::replace(&mut self.previous[button.index()], pressed);
        pressed && !was_pressed
    }
}
