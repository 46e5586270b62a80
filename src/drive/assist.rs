//! # Straight-line Assist
//!
//! Left-stick overlay for arcade mode.
//!
//! Pushing the left stick far forward or back drives straight, using the
//! wheel encoders to keep both wheels in step. Pushing it far sideways spins
//! in place. Anything else falls through to the normal arcade law.
//!
//! ```text
//! diff = (left_pos - left_base) - (right_pos - right_base)
//!
//!   diff >  angle_threshold  =>  adj = -adjustment
//!   diff < -angle_threshold  =>  adj = +adjustment
//!   otherwise                =>  adj = 0
//!
//! left = forward + adj, right = forward - adj
//! ```

use tracing::debug;

use super::control::{forward_power, ControlLaw, MotorCommand};
use crate::config::AssistConfig;
use crate::controller::mapper::ControllerState;
use crate::error::Result;
use crate::motor::{Wheel, WheelEncoders};

/// Encoder-corrected straight driving and spin-in-place.
#[derive(Debug, Clone)]
pub struct StraightAssist {
    stick_threshold: i32,
    angle_threshold: i32,
    adjustment: i32,
    /// Encoder positions at the start of the current straight segment.
    baseline: Option<(i32, i32)>,
}

impl StraightAssist {
    pub fn new(config: &AssistConfig) -> Self {
        Self {
            stick_threshold: config.stick_threshold,
            angle_threshold: config.angle_threshold,
            adjustment: config.adjustment,
            baseline: None,
        }
    }

    /// True while a straight segment is in progress.
    #[must_use]
    pub fn is_straight(&self) -> bool {
        self.baseline.is_some()
    }

    /// Correction for the travel difference `left - right` since the
    /// segment started.
    #[must_use]
    pub fn correction(&self, diff: i32) -> i32 {
        if diff > self.angle_threshold {
            -self.adjustment
        } else if diff < -self.angle_threshold {
            self.adjustment
        } else {
            0
        }
    }

    /// Overrides the arcade law when the left stick is outside its band.
    ///
    /// Returns `Ok(None)` when the normal law should apply.
    ///
    /// # Errors
    ///
    /// Returns the encoder error if a position cannot be read. The segment
    /// baseline is left untouched.
    pub fn command(
        &mut self,
        state: &ControllerState,
        law: &ControlLaw,
        encoders: &mut dyn WheelEncoders,
    ) -> Result<Option<MotorCommand>> {
        let forward = forward_power(state.left_stick_y);
        if forward.abs() >= self.stick_threshold as f32 {
            let left_pos = encoders.position(Wheel::Left)?;
            let right_pos = encoders.position(Wheel::Right)?;

            let (left_base, right_base) = match self.baseline {
                Some(baseline) => baseline,
                None => {
                    debug!("Straight segment start at ({}, {})", left_pos, right_pos);
                    self.baseline = Some((left_pos, right_pos));
                    (left_pos, right_pos)
                }
            };

            let diff = (left_pos - left_base) - (right_pos - right_base);
            let adj = self.correction(diff) as f32;
            return Ok(Some(MotorCommand::from_f32(forward + adj, forward - adj)));
        }

        self.baseline = None;

        let turn = law.turn_power(state.left_stick_x);
        if turn.abs() >= self.stick_threshold as f32 {
            return Ok(Some(MotorCommand::from_f32(-turn, turn)));
        }

        Ok(None)
    }

    /// Ends any straight segment.
    pub fn reset(&mut self) {
        self.baseline = None;
    }
}
