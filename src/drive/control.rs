//! # Control Laws
//!
//! Converts stick positions into left/right wheel power.
//!
//! ## Scaling
//!
//! Raw sticks report 0-255. Y axes grow downward, so forward power uses the
//! reversed range: `scale(y, (0, 255), (100, -100))` maps full-up to +100
//! and full-down to -100.
//!
//! ## Arcade
//!
//! ```text
//! forward = scale(right_y, (0,255), (100,-100))
//! turn    = scale(right_x, (0,255), (100,-100))   // positive = left
//! left    = forward - turn * multiplier
//! right   = forward + turn * multiplier
//! ```
//!
//! Each component below the deadband is zeroed before mixing. This is a
//! per-component rule rather than the joint "zero both only when both are
//! small" rule used for tank: a turn inside the deadband is dropped even at
//! full forward, so full forward with a resting stick gives exactly 100/100.
//!
//! ## Tank
//!
//! ```text
//! left  = scale(left_y,  (0,255), (100,-100))
//! right = scale(right_y, (0,255), (100,-100))
//! ```
//!
//! Both are zeroed when both are below the deadband, checked before rounding.
//! The turn limiter then
//! pulls the faster wheel toward the slower one until they differ by at most
//! the turn threshold.

use crate::config::TurnPositive;
use crate::controller::mapper::{ControllerState, AXIS_MAX, AXIS_MIN};

use super::params::{ControlParameters, DriveMode};

/// Largest power magnitude accepted by a motor.
pub const POWER_MAX: i32 = 100;

/// Raw stick range.
const AXIS_RANGE: (f32, f32) = (AXIS_MIN as f32, AXIS_MAX as f32);
/// Stick up = forward.
const FORWARD_RANGE: (f32, f32) = (POWER_MAX as f32, -(POWER_MAX as f32));

/// Linearly maps `value` from `src` onto `dst`.
///
/// A reversed `dst` range flips the direction.
///
/// # Examples
///
/// ```
/// use pad_drive::drive::control::scale;
///
/// assert_eq!(scale(0.0, (0.0, 255.0), (100.0, -100.0)), 100.0);
/// assert_eq!(scale(255.0, (0.0, 255.0), (100.0, -100.0)), -100.0);
/// assert_eq!(scale(127.5, (0.0, 255.0), (100.0, -100.0)), 0.0);
/// ```
#[must_use]
pub fn scale(value: f32, src: (f32, f32), dst: (f32, f32)) -> f32 {
    (value - src.0) / (src.1 - src.0) * (dst.1 - dst.0) + dst.0
}

/// Power for a pair of wheels, each in [-100, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotorCommand {
    pub left: i32,
    pub right: i32,
}

impl MotorCommand {
    /// Both wheels stopped.
    pub const STOP: MotorCommand = MotorCommand { left: 0, right: 0 };

    /// Builds a command, saturating both powers to [-100, 100].
    #[must_use]
    pub fn new(left: i32, right: i32) -> Self {
        Self {
            left: clamp_power(left),
            right: clamp_power(right),
        }
    }

    /// Rounds and saturates floating-point powers.
    #[must_use]
    pub fn from_f32(left: f32, right: f32) -> Self {
        Self::new(left.round() as i32, right.round() as i32)
    }
}

/// Saturates a power to [-100, 100].
#[must_use]
pub fn clamp_power(power: i32) -> i32 {
    power.clamp(-POWER_MAX, POWER_MAX)
}

/// Forward power for a raw Y axis value.
#[must_use]
pub fn forward_power(raw_y: i32) -> f32 {
    scale(raw_y as f32, AXIS_RANGE, FORWARD_RANGE)
}

/// Zeroes `value` when its magnitude is strictly below `deadband`.
#[must_use]
pub fn apply_deadband(value: f32, deadband: i32) -> f32 {
    if value.abs() < deadband as f32 {
        0.0
    } else {
        value
    }
}

/// Arcade components after deadband, before rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcadeMix {
    pub forward: f32,
    pub turn: f32,
    pub left: f32,
    pub right: f32,
}

/// Mixes forward and turn into unclamped wheel powers.
///
/// `left + right == 2 * forward` for any multiplier.
#[must_use]
pub fn arcade_mix(forward: f32, turn: f32, multiplier: f32, deadband: i32) -> ArcadeMix {
    let forward = apply_deadband(forward, deadband);
    let turn = apply_deadband(turn, deadband);
    ArcadeMix {
        forward,
        turn,
        left: forward - turn * multiplier,
        right: forward + turn * multiplier,
    }
}

/// Zeroes both wheels when both are strictly inside the deadband.
#[must_use]
pub fn tank_deadband(left: f32, right: f32, deadband: i32) -> (f32, f32) {
    let deadband = deadband as f32;
    if left.abs() < deadband && right.abs() < deadband {
        (0.0, 0.0)
    } else {
        (left, right)
    }
}

/// Limits the left/right difference to `threshold`.
///
/// The wheel with the larger magnitude (the right one on a tie) is moved to
/// exactly `threshold` away from the other; the slower wheel is left alone.
/// Opposite-sign spins are handled the same way.
///
/// # Examples
///
/// ```
/// use pad_drive::drive::control::limit_turn;
///
/// assert_eq!(limit_turn(-100, 100, 50), (-100, -50));
/// assert_eq!(limit_turn(20, 100, 50), (20, 70));
/// assert_eq!(limit_turn(30, 60, 50), (30, 60));
/// ```
#[must_use]
pub fn limit_turn(left: i32, right: i32, threshold: i32) -> (i32, i32) {
    if (right - left).abs() <= threshold {
        return (left, right);
    }

    if right.abs() >= left.abs() {
        let right = if right > left { left + threshold } else { left - threshold };
        (left, right)
    } else {
        let left = if left > right { right + threshold } else { right - threshold };
        (left, right)
    }
}

/// Computes motor commands from controller state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControlLaw {
    turn_positive: TurnPositive,
}

impl ControlLaw {
    /// Creates a control law with the given turn sign convention.
    #[must_use]
    pub fn new(turn_positive: TurnPositive) -> Self {
        Self { turn_positive }
    }

    /// Turn component for a raw X axis value.
    ///
    /// With [`TurnPositive::Left`], pushing the stick left gives a positive
    /// turn, which slows the left wheel.
    #[must_use]
    pub fn turn_power(&self, raw_x: i32) -> f32 {
        let dst = match self.turn_positive {
            TurnPositive::Left => (POWER_MAX as f32, -(POWER_MAX as f32)),
            TurnPositive::Right => (-(POWER_MAX as f32), POWER_MAX as f32),
        };
        scale(raw_x as f32, AXIS_RANGE, dst)
    }

    /// Runs the law selected by `params.mode`.
    #[must_use]
    pub fn compute(&self, state: &ControllerState, params: &ControlParameters) -> MotorCommand {
        match params.mode {
            DriveMode::Arcade => self.arcade(state, params),
            DriveMode::Tank => self.tank(state, params),
        }
    }

    /// Arcade components for the right stick.
    #[must_use]
    pub fn arcade_mix(&self, state: &ControllerState, params: &ControlParameters) -> ArcadeMix {
        arcade_mix(
            forward_power(state.right_stick_y),
            self.turn_power(state.right_stick_x),
            params.turn_multiplier(),
            params.deadband,
        )
    }

    /// Arcade control on the right stick.
    #[must_use]
    pub fn arcade(&self, state: &ControllerState, params: &ControlParameters) -> MotorCommand {
        let mix = self.arcade_mix(state, params);
        MotorCommand::from_f32(mix.left, mix.right)
    }

    /// Tank control on both sticks' Y axes.
    #[must_use]
    pub fn tank(&self, state: &ControllerState, params: &ControlParameters) -> MotorCommand {
        let (left, right) = tank_deadband(
            forward_power(state.left_stick_y),
            forward_power(state.right_stick_y),
            params.deadband,
        );

        let MotorCommand { left, right } = MotorCommand::from_f32(left, right);
        let (left, right) = limit_turn(left, right, params.turn_threshold);
        MotorCommand::new(left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::params::THRESHOLD_MAX;

    fn arcade_params(multiplier_pct: u8) -> ControlParameters {
        ControlParameters {
            turn_multiplier_pct: multiplier_pct,
            ..ControlParameters::default()
        }
    }

    fn tank_params(threshold: i32) -> ControlParameters {
        ControlParameters {
            mode: DriveMode::Tank,
            turn_threshold: threshold,
            ..ControlParameters::default()
        }
    }

    fn sticks(left_y: i32, right_x: i32, right_y: i32) -> ControllerState {
        let mut state = ControllerState::default();
        state.left_stick_y = left_y;
        state.right_stick_x = right_x;
        state.right_stick_y = right_y;
        state
    }

    // ==================== Scaling ====================

    #[test]
    fn test_scale_endpoints_and_midpoint() {
        assert_eq!(forward_power(0), 100.0);
        assert_eq!(forward_power(255), -100.0);
        assert_eq!(scale(127.5, AXIS_RANGE, FORWARD_RANGE), 0.0);
    }

    #[test]
    fn test_scale_monotonically_decreasing() {
        let mut previous = forward_power(0);
        for v in 1..=255 {
            let current = forward_power(v);
            assert!(current < previous, "scale not decreasing at {}", v);
            previous = current;
        }
    }

    #[test]
    fn test_scale_generic_ranges() {
        assert!((scale(99.0, (0.0, 99.0), (-1.0, 1.0)) - 1.0).abs() < 1e-6);
        assert!((scale(5.0, (0.0, 10.0), (0.0, 100.0)) - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_turn_sign_conventions() {
        let left = ControlLaw::new(TurnPositive::Left);
        assert_eq!(left.turn_power(0), 100.0);
        assert_eq!(left.turn_power(255), -100.0);

        let right = ControlLaw::new(TurnPositive::Right);
        assert_eq!(right.turn_power(0), -100.0);
        assert_eq!(right.turn_power(255), 100.0);
    }

    // ==================== MotorCommand ====================

    #[test]
    fn test_motor_command_saturates() {
        assert_eq!(MotorCommand::new(150, -130), MotorCommand { left: 100, right: -100 });
        assert_eq!(MotorCommand::from_f32(102.75, -0.4), MotorCommand { left: 100, right: 0 });
    }

    // ==================== Deadband ====================

    #[test]
    fn test_deadband_is_strict() {
        assert_eq!(apply_deadband(9.99, 10), 0.0);
        assert_eq!(apply_deadband(-9.99, 10), 0.0);
        assert_eq!(apply_deadband(10.0, 10), 10.0);
        assert_eq!(apply_deadband(-10.0, 10), -10.0);
    }

    #[test]
    fn test_arcade_small_inputs_stop() {
        for forward in [-9.5f32, -3.0, 0.0, 4.2, 9.9] {
            for turn in [-9.9f32, -1.0, 0.0, 7.5, 9.0] {
                let mix = arcade_mix(forward, turn, 1.0, 10);
                assert_eq!(MotorCommand::from_f32(mix.left, mix.right), MotorCommand::STOP);
            }
        }
    }

    #[test]
    fn test_tank_small_inputs_stop() {
        for left in [-9.9f32, -5.0, 0.0, 3.3, 9.8] {
            for right in [-9.5f32, 0.0, 2.7, 9.99] {
                assert_eq!(tank_deadband(left, right, 10), (0.0, 0.0));
            }
        }
        assert_eq!(tank_deadband(10.0, 0.0, 10), (10.0, 0.0));
        assert_eq!(tank_deadband(3.0, -40.0, 10), (3.0, -40.0));
    }

    #[test]
    fn test_tank_deadband_checked_before_rounding() {
        let law = ControlLaw::default();
        // forward_power(115) is about 9.8, which would round up to 10
        assert!(forward_power(115) < 10.0);
        assert_eq!(law.tank(&sticks(115, 124, 124), &tank_params(THRESHOLD_MAX)), MotorCommand::STOP);
        assert_eq!(law.tank(&sticks(124, 124, 134), &tank_params(THRESHOLD_MAX)), MotorCommand::STOP);
    }

    // ==================== Arcade ====================

    #[test]
    fn test_arcade_mix_preserves_forward_sum() {
        for forward in [-100.0f32, -55.5, 0.0, 12.0, 80.0] {
            for turn in [-100.0f32, -20.0, 0.0, 33.3, 100.0] {
                for pct in [10u8, 50, 100] {
                    let multiplier = f32::from(pct) / 100.0;
                    let mix = arcade_mix(forward, turn, multiplier, 10);
                    assert!(
                        (mix.left + mix.right - 2.0 * mix.forward).abs() < 1e-3,
                        "forward={} turn={} m={}",
                        forward,
                        turn,
                        multiplier
                    );
                }
            }
        }
    }

    #[test]
    fn test_arcade_full_forward_with_centered_turn() {
        let law = ControlLaw::default();
        let command = law.arcade(&sticks(124, 124, 0), &arcade_params(100));
        assert_eq!(command, MotorCommand { left: 100, right: 100 });
    }

    #[test]
    fn test_arcade_centered_is_stopped() {
        let law = ControlLaw::default();
        assert_eq!(law.compute(&ControllerState::default(), &arcade_params(100)), MotorCommand::STOP);
    }

    #[test]
    fn test_arcade_spin_left() {
        let law = ControlLaw::default();
        // Stick full left, Y centered
        let command = law.arcade(&sticks(124, 0, 124), &arcade_params(100));
        assert_eq!(command, MotorCommand { left: -100, right: 100 });
    }

    #[test]
    fn test_arcade_multiplier_reduces_turn() {
        let law = ControlLaw::default();
        let command = law.arcade(&sticks(124, 0, 124), &arcade_params(30));
        assert_eq!(command, MotorCommand { left: -30, right: 30 });
    }

    #[test]
    fn test_arcade_turn_right_convention() {
        let law = ControlLaw::new(TurnPositive::Right);
        let command = law.arcade(&sticks(124, 0, 124), &arcade_params(100));
        assert_eq!(command, MotorCommand { left: 100, right: -100 });
    }

    #[test]
    fn test_arcade_saturates_corner() {
        let law = ControlLaw::default();
        let command = law.arcade(&sticks(124, 0, 0), &arcade_params(100));
        assert_eq!(command, MotorCommand { left: 0, right: 100 });
    }

    // ==================== Tank ====================

    #[test]
    fn test_tank_independent_wheels() {
        let law = ControlLaw::default();
        let command = law.tank(&sticks(255, 124, 0), &tank_params(THRESHOLD_MAX));
        assert_eq!(command, MotorCommand { left: -100, right: 100 });
    }

    #[test]
    fn test_tank_spin_limited_pulls_right_wheel() {
        let law = ControlLaw::default();
        let command = law.tank(&sticks(255, 124, 0), &tank_params(50));
        assert_eq!(command, MotorCommand { left: -100, right: -50 });
    }

    #[test]
    fn test_tank_limit_pulls_faster_left_wheel() {
        let law = ControlLaw::default();
        // left full forward, right slightly forward
        let command = law.tank(&sticks(0, 124, 100), &tank_params(40));
        let right = forward_power(100).round() as i32;
        assert_eq!(command, MotorCommand { left: right + 40, right });
    }

    #[test]
    fn test_limit_turn_gap_is_exact() {
        for left in (-100..=100).step_by(7) {
            for right in (-100..=100).step_by(9) {
                for threshold in [0, 10, 50, 120] {
                    let (l, r) = limit_turn(left, right, threshold);
                    if (right - left).abs() > threshold {
                        assert_eq!((r - l).abs(), threshold);
                        // slower wheel untouched
                        if right.abs() >= left.abs() {
                            assert_eq!(l, left);
                        } else {
                            assert_eq!(r, right);
                        }
                    } else {
                        assert_eq!((l, r), (left, right));
                    }
                    assert!(l.abs() <= POWER_MAX && r.abs() <= POWER_MAX);
                }
            }
        }
    }

    #[test]
    fn test_limit_turn_same_sign_keeps_sign() {
        assert_eq!(limit_turn(-20, -100, 30), (-20, -50));
        assert_eq!(limit_turn(90, 10, 50), (60, 10));
    }

    #[test]
    fn test_tank_zero_threshold_equalises() {
        assert_eq!(limit_turn(40, 100, 0), (40, 40));
    }

    #[test]
    fn test_compute_dispatches_on_mode() {
        let law = ControlLaw::default();
        let state = sticks(255, 124, 0);
        assert_eq!(law.compute(&state, &arcade_params(100)), MotorCommand { left: 100, right: 100 });
        assert_eq!(law.compute(&state, &tank_params(200)), MotorCommand { left: -100, right: 100 });
    }

    #[test]
    fn test_outputs_always_in_range() {
        let law = ControlLaw::default();
        for x in (0..=255).step_by(15) {
            for y in (0..=255).step_by(15) {
                let state = sticks(y, x, 255 - y);
                for params in [arcade_params(100), arcade_params(10), tank_params(0), tank_params(200)] {
                    let c = law.compute(&state, &params);
                    assert!(c.left.abs() <= POWER_MAX && c.right.abs() <= POWER_MAX);
                }
            }
        }
    }
}
