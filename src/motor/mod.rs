//! # Motor Module
//!
//! Output side of the drive loop.
//!
//! The drive loop only talks to the [`MotorSink`] and [`WheelEncoders`]
//! traits. [`tacho::TachoDrive`] implements them for ev3dev tacho motors;
//! tests use the doubles in `mocks`.

pub mod tacho;

use crate::error::Result;

/// Drive wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wheel {
    Left,
    Right,
}

/// Optional auxiliary motor (arm, kicker, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxMotor {
    /// Driven by L1 (+) / L2 (-).
    A,
    /// Driven by R1 (+) / R2 (-).
    D,
}

/// Accepts open-loop power commands.
///
/// Commands are fire-and-forget: nothing is read back.
#[cfg_attr(test, mockall::automock)]
pub trait MotorSink {
    /// Sets a drive wheel's duty cycle, -100 to 100 percent.
    fn set_power(&mut self, wheel: Wheel, percent: i32) -> Result<()>;

    /// Sets an auxiliary motor's duty cycle. Sinks without auxiliary motors
    /// ignore this.
    fn set_aux_power(&mut self, _aux: AuxMotor, _percent: i32) -> Result<()> {
        Ok(())
    }

    /// Whether any auxiliary motor is connected.
    fn aux_available(&self) -> bool {
        false
    }

    /// Stops every motor.
    fn stop_all(&mut self) -> Result<()>;
}

/// Reads cumulative wheel rotation, in encoder degrees.
pub trait WheelEncoders {
    fn position(&mut self, wheel: Wheel) -> Result<i32>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::error::PadDriveError;
    use std::sync::{Arc, Mutex};

    /// One call recorded by [`RecordingSink`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SinkCall {
        Power(Wheel, i32),
        Aux(AuxMotor, i32),
        StopAll,
    }

    /// Sink that records every call and serves scripted encoder positions.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        pub calls: Arc<Mutex<Vec<SinkCall>>>,
        pub positions: Arc<Mutex<(i32, i32)>>,
        pub fail_writes: Arc<Mutex<bool>>,
        pub no_aux: Arc<Mutex<bool>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<SinkCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Drive wheel powers as (left, right) pairs, in order.
        pub fn wheel_pairs(&self) -> Vec<(i32, i32)> {
            let calls = self.calls();
            let powers: Vec<(Wheel, i32)> = calls
                .iter()
                .filter_map(|c| match c {
                    SinkCall::Power(w, p) => Some((*w, *p)),
                    _ => None,
                })
                .collect();
            powers
                .chunks(2)
                .filter_map(|pair| match pair {
                    [(Wheel::Left, l), (Wheel::Right, r)] => Some((*l, *r)),
                    _ => None,
                })
                .collect()
        }

        pub fn set_positions(&self, left: i32, right: i32) {
            *self.positions.lock().unwrap() = (left, right);
        }

        pub fn set_fail_writes(&self, fail: bool) {
            *self.fail_writes.lock().unwrap() = fail;
        }

        pub fn set_no_aux(&self, no_aux: bool) {
            *self.no_aux.lock().unwrap() = no_aux;
        }

        fn record(&self, call: SinkCall) -> Result<()> {
            if *self.fail_writes.lock().unwrap() {
                return Err(PadDriveError::Motor("Mock write error".to_string()));
            }
            self.calls.lock().unwrap().push(call);
            Ok(())
        }
    }

    impl MotorSink for RecordingSink {
        fn set_power(&mut self, wheel: Wheel, percent: i32) -> Result<()> {
            self.record(SinkCall::Power(wheel, percent))
        }

        fn set_aux_power(&mut self, aux: AuxMotor, percent: i32) -> Result<()> {
            self.record(SinkCall::Aux(aux, percent))
        }

        fn aux_available(&self) -> bool {
            !*self.no_aux.lock().unwrap()
        }

        fn stop_all(&mut self) -> Result<()> {
            self.record(SinkCall::StopAll)
        }
    }

    impl WheelEncoders for RecordingSink {
        fn position(&mut self, wheel: Wheel) -> Result<i32> {
            let (left, right) = *self.positions.lock().unwrap();
            Ok(match wheel {
                Wheel::Left => left,
                Wheel::Right => right,
            })
        }
    }
}
