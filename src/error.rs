//! # Error Types
//!
//! Custom error types for Pad Drive using `thiserror`.

use thiserror::Error;

/// Main error type for Pad Drive
#[derive(Debug, Error)]
pub enum PadDriveError {
    /// No input device with the configured name is listed by the kernel
    #[error("Controller '{0}' not found (is it paired and connected?)")]
    ControllerNotFound(String),

    /// The input device was found but could not be opened
    #[error("Input device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A required drive motor is not plugged in
    #[error("No tacho motor found on port {0}")]
    MotorNotFound(char),

    /// Motor command or feedback failure
    #[error("Motor error: {0}")]
    Motor(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Pad Drive
pub type Result<T> = std::result::Result<T, PadDriveError>;
