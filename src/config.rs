//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! working arcade setup for a robot with drive motors on ports B and C.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::controller::decoder::RecordLayout;
use crate::drive::params::{ControlParameters, DriveMode, MULTIPLIER_PCT_MAX, MULTIPLIER_PCT_MIN, THRESHOLD_MAX, THRESHOLD_MIN};
use crate::error::{PadDriveError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub motors: MotorConfig,
    #[serde(default)]
    pub assist: AssistConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Controller configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    /// Explicit event node; empty means discover by name
    #[serde(default)]
    pub device_path: String,

    #[serde(default = "default_device_name")]
    pub device_name: String,

    #[serde(default = "default_devices_file")]
    pub devices_file: String,

    #[serde(default)]
    pub record_layout: RecordLayout,
}

/// Which stick direction counts as a positive turn
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TurnPositive {
    /// Stick left gives a positive turn, robot turns left (default)
    #[default]
    Left,
    /// Stick right gives a positive turn
    Right,
}

/// Drive configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DriveConfig {
    #[serde(default)]
    pub mode: DriveMode,

    #[serde(default = "default_deadband")]
    pub deadband: i32,

    #[serde(default = "default_turn_multiplier_pct")]
    pub turn_multiplier_pct: u8,

    #[serde(default = "default_turn_threshold")]
    pub turn_threshold: i32,

    #[serde(default)]
    pub turn_positive: TurnPositive,

    #[serde(default)]
    pub coalesce_commands: bool,
}

/// Motor configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MotorConfig {
    #[serde(default = "default_tacho_dir")]
    pub tacho_dir: String,

    #[serde(default = "default_left_port")]
    pub left_port: char,

    #[serde(default = "default_right_port")]
    pub right_port: char,

    #[serde(default)]
    pub aux_enabled: bool,

    #[serde(default = "default_aux_a_port")]
    pub aux_a_port: char,

    #[serde(default = "default_aux_d_port")]
    pub aux_d_port: char,
}

/// Straight-line assist configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AssistConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_stick_threshold")]
    pub stick_threshold: i32,

    #[serde(default = "default_angle_threshold")]
    pub angle_threshold: i32,

    #[serde(default = "default_adjustment")]
    pub adjustment: i32,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional log file; empty logs to stderr only
    #[serde(default)]
    pub file: String,
}

// Default value functions
fn default_device_name() -> String { "Wireless Controller".to_string() }
fn default_devices_file() -> String { "/proc/bus/input/devices".to_string() }

fn default_deadband() -> i32 { 10 }
fn default_turn_multiplier_pct() -> u8 { 100 }
fn default_turn_threshold() -> i32 { 200 }

fn default_tacho_dir() -> String { "/sys/class/tacho-motor".to_string() }
fn default_left_port() -> char { 'B' }
fn default_right_port() -> char { 'C' }
fn default_aux_a_port() -> char { 'A' }
fn default_aux_d_port() -> char { 'D' }

fn default_stick_threshold() -> i32 { 50 }
fn default_angle_threshold() -> i32 { 5 }
fn default_adjustment() -> i32 { 5 }

fn default_log_level() -> String { "info".to_string() }

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            device_path: String::new(),
            device_name: default_device_name(),
            devices_file: default_devices_file(),
            record_layout: RecordLayout::default(),
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            mode: DriveMode::default(),
            deadband: default_deadband(),
            turn_multiplier_pct: default_turn_multiplier_pct(),
            turn_threshold: default_turn_threshold(),
            turn_positive: TurnPositive::default(),
            coalesce_commands: false,
        }
    }
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            tacho_dir: default_tacho_dir(),
            left_port: default_left_port(),
            right_port: default_right_port(),
            aux_enabled: false,
            aux_a_port: default_aux_a_port(),
            aux_d_port: default_aux_d_port(),
        }
    }
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stick_threshold: default_stick_threshold(),
            angle_threshold: default_angle_threshold(),
            adjustment: default_adjustment(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: String::new(),
        }
    }
}

impl DriveConfig {
    /// Starting drive parameters.
    #[must_use]
    pub fn parameters(&self) -> ControlParameters {
        ControlParameters {
            mode: self.mode,
            turn_multiplier_pct: self.turn_multiplier_pct,
            turn_threshold: self.turn_threshold,
            deadband: self.deadband,
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> PadDriveError {
    PadDriveError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pad_drive::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns `Config` if parsing or validation fails.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.controller.device_path.is_empty() {
            if self.controller.device_name.is_empty() {
                return Err(invalid("device_name cannot be empty when device_path is not set"));
            }
            if self.controller.devices_file.is_empty() {
                return Err(invalid("devices_file cannot be empty when device_path is not set"));
            }
        }

        if self.drive.deadband < 0 || self.drive.deadband > 100 {
            return Err(invalid("deadband must be between 0 and 100"));
        }

        let pct = self.drive.turn_multiplier_pct;
        if !(MULTIPLIER_PCT_MIN..=MULTIPLIER_PCT_MAX).contains(&pct) || pct % 10 != 0 {
            return Err(invalid(format!(
                "turn_multiplier_pct must be a multiple of 10 between {} and {}",
                MULTIPLIER_PCT_MIN, MULTIPLIER_PCT_MAX
            )));
        }

        if !(THRESHOLD_MIN..=THRESHOLD_MAX).contains(&self.drive.turn_threshold) {
            return Err(invalid(format!(
                "turn_threshold must be between {} and {}",
                THRESHOLD_MIN, THRESHOLD_MAX
            )));
        }

        if self.motors.tacho_dir.is_empty() {
            return Err(invalid("tacho_dir cannot be empty"));
        }

        let ports = [
            ("left_port", self.motors.left_port),
            ("right_port", self.motors.right_port),
            ("aux_a_port", self.motors.aux_a_port),
            ("aux_d_port", self.motors.aux_d_port),
        ];
        for (name, port) in ports {
            if !('A'..='D').contains(&port) {
                return Err(invalid(format!("{} must be one of A, B, C, D", name)));
            }
        }

        if self.motors.left_port == self.motors.right_port {
            return Err(invalid("left_port and right_port must differ"));
        }

        if self.motors.aux_enabled {
            for (name, port) in [("aux_a_port", self.motors.aux_a_port), ("aux_d_port", self.motors.aux_d_port)] {
                if port == self.motors.left_port || port == self.motors.right_port {
                    return Err(invalid(format!("{} cannot share a drive motor port", name)));
                }
            }
            if self.motors.aux_a_port == self.motors.aux_d_port {
                return Err(invalid("aux_a_port and aux_d_port must differ"));
            }
        }

        if self.assist.stick_threshold <= 0 || self.assist.stick_threshold > 100 {
            return Err(invalid("assist stick_threshold must be between 1 and 100"));
        }

        if self.assist.angle_threshold < 0 {
            return Err(invalid("assist angle_threshold cannot be negative"));
        }

        if self.assist.adjustment < 0 || self.assist.adjustment > 100 {
            return Err(invalid("assist adjustment must be between 0 and 100"));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("logging level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}
