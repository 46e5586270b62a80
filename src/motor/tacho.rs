//! # ev3dev Tacho Motors
//!
//! Drives LEGO motors through the ev3dev sysfs interface.
//!
//! Each motor is a directory `/sys/class/tacho-motor/motorN` whose `address`
//! file names the output port, e.g. `ev3-ports:outB`. The `N` is assigned in
//! plug order, so motors are always looked up by port.
//!
//! | Attribute | Access | Use |
//! |-----------|--------|-----|
//! | `address` | read | output port |
//! | `command` | write | `run-direct`, `stop` |
//! | `duty_cycle_sp` | write | -100..100 while in `run-direct` |
//! | `position` | read | encoder degrees |

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{AuxMotor, MotorSink, Wheel, WheelEncoders};
use crate::config::MotorConfig;
use crate::error::{PadDriveError, Result};

/// Command that makes `duty_cycle_sp` take effect immediately.
const COMMAND_RUN_DIRECT: &str = "run-direct";

/// Command that stops the motor using its stop action.
const COMMAND_STOP: &str = "stop";

/// Output port letter from an `address` value such as `ev3-ports:outB`.
///
/// # Examples
///
/// ```
/// use pad_drive::motor::tacho::parse_port;
///
/// assert_eq!(parse_port("ev3-ports:outC\n"), Some('C'));
/// assert_eq!(parse_port("ev3-ports:in1"), None);
/// ```
#[must_use]
pub fn parse_port(address: &str) -> Option<char> {
    let address = address.trim();
    let (_, port) = address.rsplit_once(":out")?;
    let mut chars = port.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ 'A'..='D'), None) => Some(c),
        _ => None,
    }
}

/// Lists the tacho motors under `tacho_dir` as (port, directory) pairs,
/// sorted by port.
///
/// # Errors
///
/// Returns `Io` if `tacho_dir` cannot be read.
pub fn list_ports(tacho_dir: &Path) -> Result<Vec<(char, PathBuf)>> {
    let mut motors = Vec::new();

    for entry in fs::read_dir(tacho_dir)? {
        let dir = entry?.path();
        match fs::read_to_string(dir.join("address")) {
            Ok(address) => match parse_port(&address) {
                Some(port) => motors.push((port, dir)),
                None => debug!("Ignoring motor at {} ({})", dir.display(), address.trim()),
            },
            Err(e) => debug!("Could not read address of {}: {}", dir.display(), e),
        }
    }

    motors.sort_by_key(|(port, _)| *port);
    Ok(motors)
}

/// One tacho motor.
#[derive(Debug, Clone)]
pub struct TachoMotor {
    port: char,
    dir: PathBuf,
}

impl TachoMotor {
    /// Finds the motor plugged into `port`.
    ///
    /// # Errors
    ///
    /// - `MotorNotFound`: nothing on that port
    /// - `Io`: `tacho_dir` cannot be read
    pub fn find(tacho_dir: &Path, port: char) -> Result<Self> {
        list_ports(tacho_dir)?
            .into_iter()
            .find(|(p, _)| *p == port)
            .map(|(port, dir)| Self { port, dir })
            .ok_or(PadDriveError::MotorNotFound(port))
    }

    /// Output port letter.
    #[must_use]
    pub fn port(&self) -> char {
        self.port
    }

    fn write_attr(&self, name: &str, value: &str) -> Result<()> {
        fs::write(self.dir.join(name), value).map_err(|e| {
            PadDriveError::Motor(format!("Failed to write {} on port {}: {}", name, self.port, e))
        })
    }

    /// Zeroes the duty cycle and switches to direct control.
    ///
    /// # Errors
    ///
    /// Returns `Motor` if the attributes cannot be written.
    pub fn start_direct(&self) -> Result<()> {
        self.set_duty_cycle(0)?;
        self.write_attr("command", COMMAND_RUN_DIRECT)
    }

    /// Sets the duty cycle, -100 to 100 percent.
    ///
    /// # Errors
    ///
    /// Returns `Motor` if the attribute cannot be written.
    pub fn set_duty_cycle(&self, percent: i32) -> Result<()> {
        self.write_attr("duty_cycle_sp", &percent.clamp(-100, 100).to_string())
    }

    /// Stops the motor.
    ///
    /// # Errors
    ///
    /// Returns `Motor` if the attribute cannot be written.
    pub fn stop(&self) -> Result<()> {
        self.write_attr("command", COMMAND_STOP)
    }

    /// Encoder position in degrees.
    ///
    /// # Errors
    ///
    /// Returns `Motor` if the attribute cannot be read or parsed.
    pub fn position(&self) -> Result<i32> {
        let raw = fs::read_to_string(self.dir.join("position")).map_err(|e| {
            PadDriveError::Motor(format!("Failed to read position on port {}: {}", self.port, e))
        })?;
        raw.trim().parse().map_err(|e| {
            PadDriveError::Motor(format!("Bad position '{}' on port {}: {}", raw.trim(), self.port, e))
        })
    }
}

/// The robot's drive motors plus any auxiliary motors.
#[derive(Debug)]
pub struct TachoDrive {
    left: TachoMotor,
    right: TachoMotor,
    aux_a: Option<TachoMotor>,
    aux_d: Option<TachoMotor>,
}

impl TachoDrive {
    /// Opens the drive motors named in `config` and any auxiliary motors
    /// that are plugged in.
    ///
    /// Auxiliary motors are opened whether or not `config.aux_enabled` is
    /// set, so Options can switch them on later. Missing ones are skipped.
    ///
    /// # Errors
    ///
    /// Returns `MotorNotFound` if a drive motor is missing, or `Motor` if a
    /// motor cannot be switched to direct control.
    pub fn open(config: &MotorConfig) -> Result<Self> {
        let tacho_dir = Path::new(&config.tacho_dir);
        let found: String = list_ports(tacho_dir)?.iter().map(|(p, _)| *p).collect();
        info!("Tacho motors found on ports: [{}]", found);

        let left = TachoMotor::find(tacho_dir, config.left_port)?;
        let right = TachoMotor::find(tacho_dir, config.right_port)?;

        let optional = |port: char| {
            if port == config.left_port || port == config.right_port {
                warn!("Auxiliary port {} is a drive port, ignoring it", port);
                return None;
            }
            match TachoMotor::find(tacho_dir, port) {
                Ok(motor) => Some(motor),
                Err(e) if config.aux_enabled => {
                    warn!("Auxiliary motor unavailable: {}", e);
                    None
                }
                Err(e) => {
                    debug!("Auxiliary motor unavailable: {}", e);
                    None
                }
            }
        };
        let aux_a = optional(config.aux_a_port);
        let aux_d = optional(config.aux_d_port);

        for motor in [Some(&left), Some(&right), aux_a.as_ref(), aux_d.as_ref()]
            .into_iter()
            .flatten()
        {
            motor.start_direct()?;
        }

        info!(
            "Drive motors ready (left: {}, right: {})",
            left.port(),
            right.port()
        );
        Ok(Self {
            left,
            right,
            aux_a,
            aux_d,
        })
    }

    /// Stops the motors in `config` without taking ownership of them.
    ///
    /// Used from the shutdown path while the drive loop still holds the
    /// [`TachoDrive`]. Failures are logged and skipped.
    pub fn stop_ports(config: &MotorConfig) {
        let tacho_dir = Path::new(&config.tacho_dir);
        let ports = [
            config.left_port,
            config.right_port,
            config.aux_a_port,
            config.aux_d_port,
        ];
        for port in ports {
            if let Ok(motor) = TachoMotor::find(tacho_dir, port) {
                if let Err(e) = motor.stop() {
                    warn!("{}", e);
                }
            }
        }
    }

    /// Encoder handle for the drive wheels.
    #[must_use]
    pub fn encoders(&self) -> TachoEncoders {
        TachoEncoders {
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }

    fn wheel(&self, wheel: Wheel) -> &TachoMotor {
        match wheel {
            Wheel::Left => &self.left,
            Wheel::Right => &self.right,
        }
    }
}

/// Reads the drive wheel encoders independently of the [`TachoDrive`].
#[derive(Debug, Clone)]
pub struct TachoEncoders {
    left: TachoMotor,
    right: TachoMotor,
}

impl MotorSink for TachoDrive {
    fn set_power(&mut self, wheel: Wheel, percent: i32) -> Result<()> {
        self.wheel(wheel).set_duty_cycle(percent)
    }

    fn set_aux_power(&mut self, aux: AuxMotor, percent: i32) -> Result<()> {
        let motor = match aux {
            AuxMotor::A => self.aux_a.as_ref(),
            AuxMotor::D => self.aux_d.as_ref(),
        };
        match motor {
            Some(motor) => motor.set_duty_cycle(percent),
            None => Ok(()),
        }
    }

    fn aux_available(&self) -> bool {
        self.aux_a.is_some() || self.aux_d.is_some()
    }

    fn stop_all(&mut self) -> Result<()> {
        let mut result = Ok(());
        for motor in [Some(&self.left), Some(&self.right), self.aux_a.as_ref(), self.aux_d.as_ref()]
            .into_iter()
            .flatten()
        {
            if let Err(e) = motor.stop() {
                warn!("{}", e);
                result = Err(e);
            }
        }
        result
    }
}

impl WheelEncoders for TachoEncoders {
    fn position(&mut self, wheel: Wheel) -> Result<i32> {
        match wheel {
            Wheel::Left => self.left.position(),
            Wheel::Right => self.right.position(),
        }
    }
}
