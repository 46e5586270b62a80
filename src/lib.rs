//! # Pad Drive Library
//!
//! Drive a LEGO EV3 differential-drive robot with a PS4 DualShock controller.
//!
//! Raw evdev records from the controller are decoded, folded into a
//! controller state, and turned into left/right wheel powers by an arcade or
//! tank control law. Face buttons tune the control law at runtime.

pub mod config;
pub mod controller;
pub mod display;
pub mod drive;
pub mod error;
pub mod motor;
pub mod session;
