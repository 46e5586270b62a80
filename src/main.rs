//! # Pad Drive
//!
//! Drive a LEGO EV3 robot with a PS4 DualShock controller.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Load configuration (`PAD_DRIVE_CONFIG`, else `config/default.toml`)
//!    - Set up logging
//!    - Find the controller's event node and the drive motors
//!
//! 2. **Drive loop** (thread `drive-loop`)
//!    - Block on one input record at a time
//!    - Update state, apply button bindings, command the wheels
//!
//! 3. **Shutdown**
//!    - Stream end: the loop stops the motors and reports its counters
//!    - Ctrl+C: motors are stopped through fresh sysfs handles
//!
//! Expected output:
//! ```text
//! INFO pad_drive: pad-drive v0.1.0 starting...
//! INFO pad_drive::controller::discovery: Found 'Wireless Controller' at /dev/input/event2
//! INFO pad_drive::motor::tacho: Drive motors ready (left: B, right: C)
//! INFO display: PS4 drive Turn:100% Arc
//! ```

use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use pad_drive::config::{Config, LoggingConfig};
use pad_drive::controller::decoder::EventReader;
use pad_drive::controller::discovery::{open_input, resolve_input_path};
use pad_drive::display::{LogDisplay, StatusDisplay};
use pad_drive::drive::assist::StraightAssist;
use pad_drive::motor::tacho::TachoDrive;
use pad_drive::session::DriveSession;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "PAD_DRIVE_CONFIG";

/// Configuration file used when `PAD_DRIVE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let path = config_path(std::env::var(CONFIG_ENV).ok(), Path::new(DEFAULT_CONFIG_PATH).exists());
    let config = match &path {
        Some(path) => Config::load(path).with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::default(),
    };

    init_logging(&config.logging);
    info!("pad-drive v{} starting...", env!("CARGO_PKG_VERSION"));
    match &path {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("Using built-in configuration"),
    }

    let mut display = LogDisplay;

    let input = match resolve_input_path(&config.controller).and_then(|p| open_input(&p)) {
        Ok(input) => input,
        Err(e) => {
            display.show("Controller not found");
            return Err(e.into());
        }
    };

    let drive = match TachoDrive::open(&config.motors) {
        Ok(drive) => drive,
        Err(e) => {
            display.show("Motors not found");
            return Err(e.into());
        }
    };
    let encoders = drive.encoders();

    let reader = EventReader::new(input, config.controller.record_layout);
    let mut session = DriveSession::new(reader, &config, drive, display);
    if config.assist.enabled {
        info!("Straight-line assist enabled");
        session = session.with_assist(StraightAssist::new(&config.assist), Box::new(encoders));
    }

    let (tx, rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("drive-loop".to_string())
        .spawn(move || {
            let _ = tx.send(session.run());
        })
        .context("Failed to start drive loop")?;

    info!("Press Ctrl+C to exit");

    tokio::select! {
        summary = rx => match summary {
            Ok(summary) => info!(
                "Controller disconnected ({} events, {} commands)",
                summary.events, summary.commands
            ),
            Err(_) => warn!("Drive loop exited without a summary"),
        },

        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl+C")?;
            info!("Received Ctrl+C, stopping motors...");
            TachoDrive::stop_ports(&config.motors);
        }
    }

    Ok(())
}

/// Picks the configuration file: the environment variable wins, then the
/// default path if it exists, else none.
fn config_path(from_env: Option<String>, default_exists: bool) -> Option<PathBuf> {
    match from_env {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ if default_exists => Some(PathBuf::from(DEFAULT_CONFIG_PATH)),
        _ => None,
    }
}

/// Logs to stderr, plus `logging.file` when set. `RUST_LOG` overrides
/// `logging.level`.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let file_layer = (!logging.file.is_empty()).then(|| {
        let path = Path::new(&logging.file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path.file_name().unwrap_or_else(|| OsStr::new("pad-drive.log"));
        fmt::layer()
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::never(dir, name))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_wins() {
        assert_eq!(
            config_path(Some("/etc/pad-drive.toml".to_string()), true),
            Some(PathBuf::from("/etc/pad-drive.toml"))
        );
    }

    #[test]
    fn test_default_config_when_present() {
        assert_eq!(config_path(None, true), Some(PathBuf::from(DEFAULT_CONFIG_PATH)));
        assert_eq!(config_path(Some(String::new()), true), Some(PathBuf::from(DEFAULT_CONFIG_PATH)));
    }

    #[test]
    fn test_builtin_config_otherwise() {
        assert_eq!(config_path(None, false), None);
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let config = Config::load(DEFAULT_CONFIG_PATH).unwrap();
        assert_eq!(config.motors.left_port, 'B');
    }
}
