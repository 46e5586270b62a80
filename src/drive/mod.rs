//! # Drive Module
//!
//! Turns controller state into wheel powers.
//!
//! - [`control`]: arcade and tank control laws
//! - [`params`]: runtime-tunable parameters and the button bindings that change them
//! - [`assist`]: encoder-corrected straight driving

pub mod assist;
pub mod control;
pub mod params;
