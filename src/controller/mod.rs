//! # Controller Module
//!
//! PS4 controller input handling.
//!
//! This module handles:
//! - Locating the controller's evdev node
//! - Decoding raw event records from it
//! - Tracking stick positions and button state
//! - Detecting button press edges

pub mod buttons;
pub mod decoder;
pub mod discovery;
pub mod mapper;
